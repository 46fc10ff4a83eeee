//! Token counting and overlap-preserving chunking

use crate::config::Vocabulary;
use crate::ExtractorError;
use std::ops::Range;
use tiktoken_rs::CoreBPE;
use tracing::{info, warn};

/// Tokens a window edge may be widened by to land on a UTF-8 boundary
const MAX_EDGE_WIDENING: usize = 3;

/// One token-bounded slice of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the sequence (0-based)
    pub index: usize,
    /// First token of the decoded span
    pub start: usize,
    /// One past the last token of the decoded span
    pub end: usize,
    /// Decoded window text
    pub text: String,
}

impl Chunk {
    /// Tokens covered by the decoded span
    pub fn token_count(&self) -> usize {
        self.end - self.start
    }
}

/// Ordered chunks of one document; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSequence {
    chunks: Vec<Chunk>,
    total_tokens: usize,
}

impl ChunkSequence {
    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when there are no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Tokens in the whole document
    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Iterate chunks in order
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    /// Chunk texts in order
    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a ChunkSequence {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// Token windows over `total` tokens
///
/// A document within budget is one window. Otherwise each window is
/// `max_tokens` wide (the last may be shorter), starts `max_tokens - overlap`
/// after the previous one, and the last ends exactly at `total`.
pub fn plan_windows(
    total: usize,
    max_tokens: usize,
    overlap: usize,
) -> Result<Vec<Range<usize>>, ExtractorError> {
    if max_tokens == 0 || overlap >= max_tokens {
        return Err(ExtractorError::InvalidChunking { max_tokens, overlap });
    }
    if total <= max_tokens {
        return Ok(vec![0..total]);
    }

    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + max_tokens).min(total);
        windows.push(start..end);
        if end == total {
            break;
        }
        start = end - overlap;
    }
    Ok(windows)
}

/// Subword tokenizer matching the target model's vocabulary
pub struct Tokenizer {
    bpe: CoreBPE,
    vocabulary: Vocabulary,
}

impl Tokenizer {
    /// Load `preferred`, falling back to its documented alternative
    pub fn load(preferred: Vocabulary) -> Result<Self, ExtractorError> {
        Self::load_with(preferred, load_bpe)
    }

    fn load_with<L>(preferred: Vocabulary, loader: L) -> Result<Self, ExtractorError>
    where
        L: Fn(Vocabulary) -> anyhow::Result<CoreBPE>,
    {
        info!("Loading {} tokenizer...", preferred);
        match loader(preferred) {
            Ok(bpe) => {
                info!("{} tokenizer loaded successfully.", preferred);
                Ok(Self {
                    bpe,
                    vocabulary: preferred,
                })
            }
            Err(primary) => {
                let fallback = preferred.fallback();
                warn!(
                    "Failed to load {} tokenizer ({}). Falling back to {}.",
                    preferred, primary, fallback
                );
                let bpe = loader(fallback).map_err(|e| {
                    ExtractorError::Tokenizer(format!(
                        "neither {} ({}) nor {} ({}) could be loaded",
                        preferred, primary, fallback, e
                    ))
                })?;
                info!("{} tokenizer loaded successfully.", fallback);
                Ok(Self {
                    bpe,
                    vocabulary: fallback,
                })
            }
        }
    }

    /// Vocabulary actually in use
    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Number of tokens in `text`
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Split `text` into overlapping windows of at most `max_tokens` tokens
    ///
    /// A text within budget comes back as a single chunk equal to the input.
    /// A window whose edge splits a multi-byte character is widened by up to
    /// `MAX_EDGE_WIDENING` tokens per side, so such a chunk may exceed
    /// `max_tokens`; its `start`/`end` report the widened span.
    pub fn chunk(
        &self,
        text: &str,
        max_tokens: usize,
        overlap: usize,
    ) -> Result<ChunkSequence, ExtractorError> {
        let tokens = self.bpe.encode_ordinary(text);
        let total = tokens.len();
        let windows = plan_windows(total, max_tokens, overlap)?;

        if windows.len() == 1 {
            return Ok(ChunkSequence {
                chunks: vec![Chunk {
                    index: 0,
                    start: 0,
                    end: total,
                    text: text.to_string(),
                }],
                total_tokens: total,
            });
        }

        let mut chunks = Vec::with_capacity(windows.len());
        for (index, window) in windows.into_iter().enumerate() {
            let (span, text) = decode_window(total, window, |range| {
                self.bpe
                    .decode(tokens[range].to_vec())
                    .map_err(|e| e.to_string())
            })?;
            chunks.push(Chunk {
                index,
                start: span.start,
                end: span.end,
                text,
            });
        }

        Ok(ChunkSequence {
            chunks,
            total_tokens: total,
        })
    }
}

/// Decode a window, widening its edges by up to a few tokens when a
/// multi-byte character straddles a boundary
///
/// Candidates are tried by total widening, so the narrowest decodable span wins.
/// Returns the span that decoded along with its text.
fn decode_window<F>(
    total: usize,
    window: Range<usize>,
    decode: F,
) -> Result<(Range<usize>, String), ExtractorError>
where
    F: Fn(Range<usize>) -> Result<String, String>,
{
    let mut last_error = String::new();
    for widen in 0..=(2 * MAX_EDGE_WIDENING) {
        for left in 0..=widen.min(MAX_EDGE_WIDENING) {
            let right = widen - left;
            if right > MAX_EDGE_WIDENING {
                continue;
            }
            let start = window.start.saturating_sub(left);
            let end = (window.end + right).min(total);
            match decode(start..end) {
                Ok(text) => return Ok((start..end, text)),
                Err(e) => last_error = e,
            }
        }
    }

    Err(ExtractorError::Tokenizer(format!(
        "window {}..{} does not decode: {}",
        window.start, window.end, last_error
    )))
}

fn load_bpe(vocabulary: Vocabulary) -> anyhow::Result<CoreBPE> {
    match vocabulary {
        Vocabulary::O200kBase => tiktoken_rs::o200k_base(),
        Vocabulary::Cl100kBase => tiktoken_rs::cl100k_base(),
    }
}

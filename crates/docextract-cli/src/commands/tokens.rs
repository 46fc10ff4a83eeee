//! Tokens command implementation.

use crate::cli::TokensArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docextract_extractor::{ExtractorError, Tokenizer};
use serde::Serialize;

/// Size of a document as the extractor sees it
#[derive(Debug, Clone, Serialize)]
pub struct TokenReport {
    /// File measured
    pub file: String,
    /// Characters of extracted text
    pub characters: usize,
    /// Tokens in the configured vocabulary
    pub tokens: usize,
    /// Vocabulary actually loaded
    pub vocabulary: String,
    /// Chunks the document would be split into
    pub chunks: usize,
    /// Window width
    pub max_tokens: usize,
    /// Window overlap
    pub token_overlap: usize,
}

/// Execute the tokens command.
pub async fn execute_tokens(args: TokensArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let settings = &config.extractor;
    settings.validate()?;

    let text_extractor = settings.text_extractor();
    let path = args.file.clone();
    let text = tokio::task::spawn_blocking(move || text_extractor.extract_text(&path))
        .await
        .map_err(|e| CliError::InvalidInput(format!("extraction task failed: {}", e)))?
        .map_err(ExtractorError::from)?;

    let tokenizer = Tokenizer::load(settings.vocabulary)?;
    let chunks = tokenizer.chunk(&text, settings.max_tokens, settings.token_overlap)?;

    let report = TokenReport {
        file: args.file.display().to_string(),
        characters: text.chars().count(),
        tokens: chunks.total_tokens(),
        vocabulary: tokenizer.vocabulary().to_string(),
        chunks: chunks.len(),
        max_tokens: settings.max_tokens,
        token_overlap: settings.token_overlap,
    };

    println!("{}", formatter.tokens(&report)?);
    Ok(())
}

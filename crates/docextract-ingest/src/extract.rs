//! Format dispatch and the scan-density heuristic

use crate::docx::extract_docx;
use crate::ocr::OcrRecognizer;
use crate::pdf::{scan_density, PdfBackend};
use crate::txt::decode_text;
use crate::IngestError;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Average characters per page below which a PDF is treated as scanned
pub const DEFAULT_SCAN_DENSITY_THRESHOLD: f64 = 100.0;

/// Pixel width of rendered pages sent to OCR
pub const DEFAULT_RENDER_WIDTH: u32 = 1700;

/// Supported input formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.pdf`
    Pdf,
    /// `.docx`
    Docx,
    /// `.txt`
    Txt,
}

impl DocumentFormat {
    /// Detect the format from the (case-insensitive) file extension
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Txt),
            "" => Err(IngestError::UnsupportedFormat("(no extension)".to_string())),
            other => Err(IngestError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::Txt => write!(f, "txt"),
        }
    }
}

/// Pulls raw text out of a document file
///
/// Blocking; run it off the async executor.
pub struct TextExtractor {
    pdf: Box<dyn PdfBackend>,
    ocr: Option<Box<dyn OcrRecognizer>>,
    scan_density_threshold: f64,
    render_width: u32,
}

impl TextExtractor {
    /// Create an extractor without OCR
    pub fn new(pdf: impl PdfBackend + 'static) -> Self {
        Self {
            pdf: Box::new(pdf),
            ocr: None,
            scan_density_threshold: DEFAULT_SCAN_DENSITY_THRESHOLD,
            render_width: DEFAULT_RENDER_WIDTH,
        }
    }

    /// Attach an OCR recognizer for scanned PDFs
    pub fn with_ocr(mut self, ocr: impl OcrRecognizer + 'static) -> Self {
        self.ocr = Some(Box::new(ocr));
        self
    }

    /// Set the scan-density threshold (average characters per page)
    pub fn with_scan_density_threshold(mut self, threshold: f64) -> Self {
        self.scan_density_threshold = threshold;
        self
    }

    /// Set the pixel width pages are rendered at for OCR
    pub fn with_render_width(mut self, width: u32) -> Self {
        self.render_width = width;
        self
    }

    /// Whether an OCR recognizer is attached
    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Extract text from a file, dispatching on its extension
    pub fn extract_text(&self, path: &Path) -> Result<String, IngestError> {
        let format = DocumentFormat::from_path(path)?;
        let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), %format, bytes = bytes.len(), "Extracting text");

        match format {
            DocumentFormat::Pdf => self.extract_pdf(&bytes),
            DocumentFormat::Docx => extract_docx(&bytes),
            DocumentFormat::Txt => Ok(decode_text(bytes)),
        }
    }

    /// Extract text from PDF bytes, falling back to OCR for sparse text layers
    pub fn extract_pdf(&self, bytes: &[u8]) -> Result<String, IngestError> {
        let pages = self.pdf.page_texts(bytes)?;
        let total_chars: usize = pages.iter().map(|p| p.trim().chars().count()).sum();
        let density = scan_density(&pages);

        info!(
            "PDF extraction stats: {} pages, {} chars, avg {:.2} chars/page",
            pages.len(),
            total_chars,
            density
        );

        if density >= self.scan_density_threshold {
            return Ok(pages.join("\n"));
        }

        info!(
            "Average characters per page ({:.2}) is below threshold ({}). Assuming scanned PDF.",
            density, self.scan_density_threshold
        );
        self.ocr_pages(bytes)
    }

    fn ocr_pages(&self, bytes: &[u8]) -> Result<String, IngestError> {
        let Some(ocr) = &self.ocr else {
            warn!("No OCR recognizer configured. Returning empty text for scanned PDF.");
            return Ok(String::new());
        };

        let images = self.pdf.render_pages(bytes, self.render_width)?;
        let total = images.len();
        let mut parts = Vec::with_capacity(total);
        for (index, image) in images.iter().enumerate() {
            info!("Performing OCR on page {}/{}", index + 1, total);
            parts.push(ocr.recognize(image)?);
        }
        Ok(parts.join("\n\n"))
    }
}

//! docextract Ingest
//!
//! Raw text extraction from PDF, DOCX and TXT files.
//!
//! PDFs whose text layer is too sparse (average characters per page below a
//! threshold) are treated as scans: every page is rasterized and sent through
//! an [`OcrRecognizer`] instead.
//!
//! # Examples
//!
//! ```no_run
//! use docextract_ingest::{PdfiumBackend, TesseractCli, TextExtractor};
//! use std::path::Path;
//!
//! let extractor = TextExtractor::new(PdfiumBackend::new())
//!     .with_ocr(TesseractCli::new("eng"))
//!     .with_scan_density_threshold(100.0);
//!
//! let text = extractor.extract_text(Path::new("contract.pdf"))?;
//! # Ok::<(), docextract_ingest::IngestError>(())
//! ```

#![warn(missing_docs)]

mod docx;
mod error;
mod extract;
mod ocr;
mod pdf;
mod txt;

pub use docx::extract_docx;
pub use error::IngestError;
pub use extract::{DocumentFormat, TextExtractor, DEFAULT_RENDER_WIDTH, DEFAULT_SCAN_DENSITY_THRESHOLD};
pub use ocr::{OcrRecognizer, TesseractCli};
pub use pdf::{PdfBackend, PdfiumBackend};
pub use txt::decode_text;

//! PDF text layer and page rendering

use crate::IngestError;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use pdfium_render::prelude::{PdfRenderConfig, Pdfium, PdfiumError};
use std::env;
use std::path::{Path, PathBuf};

/// Access to a PDF engine
///
/// Separated from the density heuristic so the routing decision can be
/// exercised without a native PDF library.
pub trait PdfBackend: Send + Sync {
    /// Text layer of every page, in page order
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, IngestError>;

    /// Every page rendered to PNG at the given pixel width, in page order
    fn render_pages(&self, bytes: &[u8], target_width: u32) -> Result<Vec<Vec<u8>>, IngestError>;
}

/// Pdfium-backed PDF engine
///
/// The library is bound per document; binding order is the configured path,
/// `PDFIUM_LIBRARY_PATH`, the working directory, then the system library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
    library_path: Option<PathBuf>,
}

impl PdfiumBackend {
    /// Bind using the default search order
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to an explicit library file or directory first
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn load(&self) -> Result<Pdfium, IngestError> {
        let configured = self
            .library_path
            .clone()
            .or_else(|| env::var_os("PDFIUM_LIBRARY_PATH").map(PathBuf::from));

        if let Some(path) = configured {
            if let Some(result) = try_bind_from_path(&path) {
                return result.map_err(|e| {
                    IngestError::Pdf(format!("Failed to load Pdfium from {}: {}", path.display(), e))
                });
            }
        }

        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")) {
            Ok(bindings) => Ok(Pdfium::new(bindings)),
            Err(primary_err) => match Pdfium::bind_to_system_library() {
                Ok(bindings) => Ok(Pdfium::new(bindings)),
                Err(_) => Err(IngestError::Pdf(format!(
                    "Failed to load Pdfium runtime: {}",
                    primary_err
                ))),
            },
        }
    }
}

fn try_bind_from_path(path: &Path) -> Option<Result<Pdfium, PdfiumError>> {
    if path.is_dir() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(path);
        Some(Pdfium::bind_to_library(lib_path).map(Pdfium::new))
    } else if path.exists() {
        Some(Pdfium::bind_to_library(path).map(Pdfium::new))
    } else {
        None
    }
}

impl PdfBackend for PdfiumBackend {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, IngestError> {
        let pdfium = self.load()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| IngestError::Pdf(format!("Failed to load PDF document: {}", e)))?;

        let mut pages = Vec::with_capacity(document.pages().len() as usize);
        for (index, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| IngestError::Pdf(format!("Failed to extract text for page {}: {}", index + 1, e)))?
                .all();
            pages.push(text);
        }
        Ok(pages)
    }

    fn render_pages(&self, bytes: &[u8], target_width: u32) -> Result<Vec<Vec<u8>>, IngestError> {
        let pdfium = self.load()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| IngestError::Pdf(format!("Failed to load PDF document: {}", e)))?;

        let render_config = PdfRenderConfig::new().set_target_width(target_width as i32);
        let mut images = Vec::with_capacity(document.pages().len() as usize);

        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| IngestError::Pdf(format!("Failed to render page {}: {}", index + 1, e)))?;

            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            let rgba = bitmap.as_rgba_bytes();

            let mut encoded = Vec::new();
            PngEncoder::new(&mut encoded)
                .write_image(&rgba, width, height, ColorType::Rgba8.into())
                .map_err(|e| IngestError::Pdf(format!("Failed to encode page {}: {}", index + 1, e)))?;
            images.push(encoded);
        }
        Ok(images)
    }
}

/// Mean extracted characters per page, whitespace-trimmed; zero for no pages
pub(crate) fn scan_density(pages: &[String]) -> f64 {
    if pages.is_empty() {
        return 0.0;
    }
    let total: usize = pages.iter().map(|p| p.trim().chars().count()).sum();
    total as f64 / pages.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_density_is_mean_of_trimmed_pages() {
        let pages = vec!["  abcd  ".to_string(), String::new(), "ab\n".to_string()];
        assert_eq!(scan_density(&pages), 2.0);
    }

    #[test]
    fn test_scan_density_counts_chars_not_bytes() {
        let pages = vec!["łódź".to_string()];
        assert_eq!(scan_density(&pages), 4.0);
    }

    #[test]
    fn test_scan_density_no_pages() {
        assert_eq!(scan_density(&[]), 0.0);
    }

    #[test]
    fn test_missing_explicit_library_path_falls_through() {
        assert!(try_bind_from_path(Path::new("/definitely/not/here/libpdfium.so")).is_none());
    }
}

//! OCR recognizers

use crate::IngestError;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Turns one rendered page image into text
pub trait OcrRecognizer: Send + Sync {
    /// Recognize text in a PNG-encoded page image
    fn recognize(&self, png: &[u8]) -> Result<String, IngestError>;
}

/// Tesseract invoked as an external process
///
/// The image is piped through stdin and the text read back from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
}

impl TesseractCli {
    /// Use `tesseract` from `PATH` with the given language pack
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: language.into(),
        }
    }

    /// Use a specific tesseract binary
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Language pack passed with `-l`
    pub fn language(&self) -> &str {
        &self.language
    }

    /// True when the binary can be started
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl OcrRecognizer for TesseractCli {
    fn recognize(&self, png: &[u8]) -> Result<String, IngestError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| IngestError::Ocr(format!("Failed to start {}: {}", self.binary.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(png)
                .map_err(|e| IngestError::Ocr(format!("Failed to send page image: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| IngestError::Ocr(format!("Tesseract did not finish: {}", e)))?;

        if !output.status.success() {
            return Err(IngestError::Ocr(format!(
                "Tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        debug!(bytes = output.stdout.len(), "Tesseract output received");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

//! Configuration for the Extractor

use crate::ExtractorError;
use docextract_ingest::{
    PdfiumBackend, TesseractCli, TextExtractor, DEFAULT_RENDER_WIDTH, DEFAULT_SCAN_DENSITY_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Default system instructions sent with every chunk
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a specialized data extraction agent. Extract all required information from the provided text.";

/// BPE vocabulary used for token counting and chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    /// GPT-4o family vocabulary
    O200kBase,
    /// GPT-4 / GPT-3.5 vocabulary
    Cl100kBase,
}

impl Vocabulary {
    /// Vocabulary name
    pub fn as_str(&self) -> &'static str {
        match self {
            Vocabulary::O200kBase => "o200k_base",
            Vocabulary::Cl100kBase => "cl100k_base",
        }
    }

    /// Vocabulary tried when this one cannot be loaded
    pub fn fallback(&self) -> Vocabulary {
        match self {
            Vocabulary::O200kBase => Vocabulary::Cl100kBase,
            Vocabulary::Cl100kBase => Vocabulary::O200kBase,
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Model identifier passed to the model service
    pub model: String,

    /// Maximum tokens per chunk
    pub max_tokens: usize,

    /// Tokens shared by adjacent chunks
    pub token_overlap: usize,

    /// Average characters per PDF page below which OCR is used
    pub scan_density_threshold: f64,

    /// Schema file (absolute, or relative to the working directory or `app_root`)
    pub schema_path: String,

    /// Fallback directory for resolving `schema_path`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_root: Option<PathBuf>,

    /// Maximum time for a single model call (seconds)
    pub model_timeout_secs: u64,

    /// Preferred tokenizer vocabulary
    pub vocabulary: Vocabulary,

    /// System instructions sent with every chunk
    pub instructions: String,

    /// Run OCR on scanned PDFs when a recognizer is available
    pub ocr_enabled: bool,

    /// Tesseract language pack
    pub ocr_language: String,

    /// Pixel width pages are rendered at for OCR
    pub ocr_render_width: u32,

    /// Pdfium library file or directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdfium_library_path: Option<PathBuf>,
}

impl ExtractorConfig {
    /// Get the model timeout as a Duration
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.model.trim().is_empty() {
            return Err(ExtractorError::Config("model must not be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(ExtractorError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.token_overlap >= self.max_tokens {
            return Err(ExtractorError::InvalidChunking {
                max_tokens: self.max_tokens,
                overlap: self.token_overlap,
            });
        }
        if !self.scan_density_threshold.is_finite() || self.scan_density_threshold < 0.0 {
            return Err(ExtractorError::Config(
                "scan_density_threshold must be a non-negative number".to_string(),
            ));
        }
        if self.model_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "model_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.schema_path.trim().is_empty() {
            return Err(ExtractorError::Config("schema_path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Overlay deployment environment variables
    ///
    /// Reads `MODEL_ID`, `MAX_TOKENS`, `TOKEN_OVERLAP`, `RESPONSE_SCHEMA_PATH`
    /// and `SCAN_DENSITY_THRESHOLD`.
    pub fn apply_env(&mut self) -> Result<(), ExtractorError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ExtractorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("MODEL_ID") {
            self.model = model;
        }
        if let Some(value) = lookup("MAX_TOKENS") {
            self.max_tokens = parse_var("MAX_TOKENS", &value)?;
        }
        if let Some(value) = lookup("TOKEN_OVERLAP") {
            self.token_overlap = parse_var("TOKEN_OVERLAP", &value)?;
        }
        if let Some(path) = lookup("RESPONSE_SCHEMA_PATH") {
            self.schema_path = path;
        }
        if let Some(value) = lookup("SCAN_DENSITY_THRESHOLD") {
            self.scan_density_threshold = parse_var("SCAN_DENSITY_THRESHOLD", &value)?;
        }
        Ok(())
    }

    /// Text extractor wired from this configuration
    ///
    /// Pdfium reads PDFs; Tesseract handles scanned pages when OCR is enabled
    /// and the binary can be started.
    pub fn text_extractor(&self) -> TextExtractor {
        let pdf = match &self.pdfium_library_path {
            Some(path) => PdfiumBackend::with_library_path(path.clone()),
            None => PdfiumBackend::new(),
        };

        let extractor = TextExtractor::new(pdf)
            .with_scan_density_threshold(self.scan_density_threshold)
            .with_render_width(self.ocr_render_width);

        if !self.ocr_enabled {
            return extractor;
        }

        let tesseract = TesseractCli::new(self.ocr_language.clone());
        if tesseract.is_available() {
            extractor.with_ocr(tesseract)
        } else {
            warn!("Tesseract OCR is not installed. Scanned PDFs cannot be processed.");
            extractor
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ExtractorError>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ExtractorError::Config(format!("{}={:?} is invalid: {}", key, value, e)))
}

impl Default for ExtractorConfig {
    /// Default configuration for 128k-context models
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 100_000,
            token_overlap: 500,
            scan_density_threshold: DEFAULT_SCAN_DENSITY_THRESHOLD,
            schema_path: "contract_model.schema.json".to_string(),
            app_root: None,
            model_timeout_secs: 120,
            vocabulary: Vocabulary::O200kBase,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            ocr_enabled: true,
            ocr_language: "eng".to_string(),
            ocr_render_width: DEFAULT_RENDER_WIDTH,
            pdfium_library_path: None,
        }
    }
}

impl ExtractorConfig {
    /// Compact preset: small windows for small-context or local models
    pub fn compact() -> Self {
        Self {
            max_tokens: 6_000,
            token_overlap: 200,
            model_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Wide preset: large windows and a longer timeout for long-context models
    pub fn wide() -> Self {
        Self {
            max_tokens: 400_000,
            token_overlap: 2_000,
            model_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 100_000);
        assert_eq!(config.token_overlap, 500);
        assert_eq!(config.scan_density_threshold, 100.0);
        assert_eq!(config.model_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::compact().validate().is_ok());
        assert!(ExtractorConfig::wide().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_less_than_max() {
        let config = ExtractorConfig {
            max_tokens: 500,
            token_overlap: 500,
            ..ExtractorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExtractorError::InvalidChunking { max_tokens: 500, overlap: 500 })
        ));
    }

    #[test]
    fn test_invalid_threshold_and_timeout() {
        let mut config = ExtractorConfig::default();
        config.scan_density_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.model_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::compact();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml(
            r#"
            model = "gpt-4o"
            vocabulary = "cl100k_base"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.model, "gpt-4o");
        assert_eq!(parsed.vocabulary, Vocabulary::Cl100kBase);
        assert_eq!(parsed.max_tokens, 100_000);
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("MODEL_ID", "gpt-4o"),
            ("MAX_TOKENS", "2000"),
            ("TOKEN_OVERLAP", " 100 "),
            ("RESPONSE_SCHEMA_PATH", "schemas/lease.json"),
            ("SCAN_DENSITY_THRESHOLD", "42.5"),
        ]
        .into_iter()
        .collect();

        let mut config = ExtractorConfig::default();
        config
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.token_overlap, 100);
        assert_eq!(config.schema_path, "schemas/lease.json");
        assert_eq!(config.scan_density_threshold, 42.5);
    }

    #[test]
    fn test_env_overlay_rejects_garbage() {
        let mut config = ExtractorConfig::default();
        let result = config.apply_vars(|key| (key == "MAX_TOKENS").then(|| "lots".to_string()));
        assert!(matches!(result, Err(ExtractorError::Config(msg)) if msg.contains("MAX_TOKENS")));
    }

    #[test]
    fn test_text_extractor_without_ocr() {
        let config = ExtractorConfig {
            ocr_enabled: false,
            ..ExtractorConfig::default()
        };
        assert!(!config.text_extractor().has_ocr());
    }

    #[test]
    fn test_vocabulary_fallback() {
        assert_eq!(Vocabulary::O200kBase.fallback(), Vocabulary::Cl100kBase);
        assert_eq!(Vocabulary::Cl100kBase.to_string(), "cl100k_base");
    }
}

//! Core Extractor implementation

use crate::chunking::Tokenizer;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::prompt::{has_content, PromptBuilder};
use docextract_domain::{
    sanitize, CompiledSchema, DocumentId, DocumentStatus, ExtractionOutcome, ModelClient,
    ModelRequest, OutputContract, SchemaCompiler, StatusStore, StatusUpdate,
};
use docextract_gatekeeper::{ContractLimits, StrictnessValidator};
use docextract_ingest::TextExtractor;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Result of one chunk's model call
#[derive(Debug)]
enum ChunkOutcome {
    /// Sanitized structured value; becomes the accumulated data
    Extracted(Value),
    /// Reason the chunk failed
    Failed(String),
}

/// The Extractor turns a document into a structured value shaped by the
/// compiled schema, one chunk at a time
///
/// Chunks are processed strictly in order. Each chunk's reply replaces the
/// accumulated data outright; the previous value is handed to the model as
/// context to merge.
pub struct Extractor<M>
where
    M: ModelClient,
{
    model: Arc<M>,
    schema: Arc<CompiledSchema>,
    contract: OutputContract,
    tokenizer: Arc<Tokenizer>,
    text_extractor: Arc<TextExtractor>,
    prompt: PromptBuilder,
    config: ExtractorConfig,
}

impl<M> Extractor<M>
where
    M: ModelClient,
{
    /// Compile and validate the configured schema, then load the tokenizer
    ///
    /// Any failure here aborts startup; no document is accepted with an
    /// invalid contract.
    pub fn initialize(config: ExtractorConfig, model: M) -> Result<Self, ExtractorError> {
        Self::initialize_with_limits(config, model, &ContractLimits::default())
    }

    /// Like [`Extractor::initialize`] with explicit contract limits
    pub fn initialize_with_limits(
        config: ExtractorConfig,
        model: M,
        limits: &ContractLimits,
    ) -> Result<Self, ExtractorError> {
        config.validate()?;

        let mut compiler = SchemaCompiler::new();
        if let Some(root) = &config.app_root {
            compiler = compiler.with_app_root(root.clone());
        }
        let schema = compiler.load(&config.schema_path)?;

        Self::with_schema(schema, config, model, limits)
    }

    /// Build an extractor around an already compiled schema
    pub fn with_schema(
        schema: CompiledSchema,
        config: ExtractorConfig,
        model: M,
        limits: &ContractLimits,
    ) -> Result<Self, ExtractorError> {
        config.validate()?;
        limits.validate()?;

        let stats = StrictnessValidator::new(limits.clone()).validate(&schema)?;
        debug!(
            depth = stats.max_depth,
            properties = stats.properties,
            "Output contract accepted"
        );

        let tokenizer = Tokenizer::load(config.vocabulary)?;
        let text_extractor = config.text_extractor();

        info!(
            "Extractor initialized with model {} (max_tokens={}, overlap={}, vocabulary={})",
            model.model_name(),
            config.max_tokens,
            config.token_overlap,
            tokenizer.vocabulary()
        );

        Ok(Self {
            model: Arc::new(model),
            contract: schema.contract(),
            schema: Arc::new(schema),
            tokenizer: Arc::new(tokenizer),
            text_extractor: Arc::new(text_extractor),
            prompt: PromptBuilder::with_instructions(config.instructions.clone()),
            config,
        })
    }

    /// Replace the text extractor (custom PDF backend or OCR engine)
    pub fn with_text_extractor(mut self, text_extractor: TextExtractor) -> Self {
        self.text_extractor = Arc::new(text_extractor);
        self
    }

    /// The compiled schema
    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    /// The contract sent with every model call
    pub fn contract(&self) -> &OutputContract {
        &self.contract
    }

    /// The tokenizer in use
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Pull the raw text out of a file on a blocking worker thread
    pub async fn extract_text_content(&self, path: &Path) -> Result<String, ExtractorError> {
        let text_extractor = Arc::clone(&self.text_extractor);
        let path: PathBuf = path.to_path_buf();

        tokio::task::spawn_blocking(move || text_extractor.extract_text(&path))
            .await
            .map_err(|e| ExtractorError::Extraction(format!("extraction task failed: {}", e)))?
            .map_err(ExtractorError::from)
    }

    /// Process one document end to end
    ///
    /// Never fails: every error is folded into the returned outcome, with
    /// whatever data was accumulated before the failure.
    pub async fn process_document(&self, path: &Path) -> ExtractionOutcome {
        info!("Extracting text from file: {}", path.display());

        let text = match self.extract_text_content(path).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error processing file {}: {}", path.display(), e);
                return ExtractionOutcome::failed(e.to_string());
            }
        };

        if text.trim().is_empty() {
            warn!("No text content found in file: {}", path.display());
            return ExtractionOutcome::failed(ExtractorError::NoTextContent.to_string());
        }

        info!(
            "Chunking text with max_tokens={}, overlap={}",
            self.config.max_tokens, self.config.token_overlap
        );
        let chunks = match self
            .tokenizer
            .chunk(&text, self.config.max_tokens, self.config.token_overlap)
        {
            Ok(chunks) => chunks,
            Err(e) => {
                error!("Error processing file {}: {}", path.display(), e);
                return ExtractionOutcome::failed(e.to_string());
            }
        };

        info!(
            "Text extracted successfully - Length: {} chars, Tokens: {}",
            text.chars().count(),
            chunks.total_tokens()
        );

        let total = chunks.len();
        info!("Document split into {} chunk(s)", total);

        let mut accumulated: Option<Value> = None;
        for chunk in &chunks {
            let number = chunk.index + 1;
            info!(
                "Processing chunk {}/{} ({} tokens)...",
                number,
                total,
                chunk.token_count()
            );

            match self.extract_chunk(&chunk.text, accumulated.as_ref()).await {
                ChunkOutcome::Extracted(data) => {
                    info!("Chunk {}/{} processed successfully", number, total);
                    accumulated = Some(data);
                }
                ChunkOutcome::Failed(reason) => {
                    error!("Chunk {}/{} failed: {}", number, total, reason);
                    return match accumulated.filter(has_content) {
                        Some(data) => ExtractionOutcome::partial(
                            data,
                            format!("Partial failure at chunk {}/{}: {}", number, total, reason),
                        ),
                        None => ExtractionOutcome::failed(reason),
                    };
                }
            }
        }

        info!("All {} chunk(s) processed successfully", total);
        ExtractionOutcome::success(
            accumulated.unwrap_or_else(|| json!({})),
            format!("All {} chunk(s) processed", total),
        )
    }

    /// Process a document and report its lifecycle to a status store
    ///
    /// Emits `inprogress` before work begins and `success` or `failed` after.
    /// Store failures are logged and never change the returned outcome.
    pub async fn process_tracked<S>(
        &self,
        id: DocumentId,
        path: &Path,
        store: &S,
    ) -> ExtractionOutcome
    where
        S: StatusStore,
    {
        report(
            store,
            StatusUpdate::new(id, DocumentStatus::InProgress).with_message("Processing document"),
        )
        .await;

        let outcome = self.process_document(path).await;

        let update = if outcome.is_success() {
            StatusUpdate::new(id, DocumentStatus::Success)
                .with_data(outcome.data.clone())
                .with_message(outcome.message.clone())
        } else {
            StatusUpdate::new(id, DocumentStatus::Failed)
                .with_data(outcome.data.clone())
                .with_message(outcome.message.clone())
                .with_errors(json!({ "error": outcome.message }))
        };
        report(store, update).await;

        outcome
    }

    /// One model call for one chunk, with the previous result as context
    async fn extract_chunk(&self, text: &str, previous: Option<&Value>) -> ChunkOutcome {
        let system_prompt = self.prompt.system_prompt(previous);
        let request = ModelRequest {
            system_prompt: &system_prompt,
            user_text: text,
            contract: &self.contract,
        };

        let reply = match timeout(self.config.model_timeout(), self.model.call(request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                error!("Extraction error: {}", e);
                return ChunkOutcome::Failed(ExtractorError::ModelCall(e.to_string()).to_string());
            }
            Err(_) => {
                return ChunkOutcome::Failed(
                    ExtractorError::Timeout(self.config.model_timeout_secs).to_string(),
                )
            }
        };

        if let Some(refusal) = reply.refusal {
            return ChunkOutcome::Failed(ExtractorError::ModelRefusal(refusal).to_string());
        }

        let Some(parsed) = reply.parsed else {
            return ChunkOutcome::Failed(ExtractorError::UnparsedResponse.to_string());
        };

        if let Err(e) = self.schema.root.conform(&parsed) {
            return ChunkOutcome::Failed(ExtractorError::from(e).to_string());
        }

        ChunkOutcome::Extracted(sanitize(parsed))
    }
}

/// Forward an update to the store, logging failures
async fn report<S: StatusStore>(store: &S, update: StatusUpdate) {
    let id = update.id;
    let status = update.status;
    if let Err(e) = store.update(update).await {
        error!("Failed to record status {} for {}: {}", status.as_str(), id, e);
    }
}

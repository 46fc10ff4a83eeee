//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::provider::Provider;
use docextract_domain::ExtractionOutcome;
use docextract_extractor::Extractor;
use docextract_store::SqliteTracker;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

/// Execute the extract command.
///
/// Startup (provider, schema, strictness, tokenizer) happens before any
/// tracker row is written; a startup error means the document is never
/// touched. Returns the processing outcome so the caller can pick an exit
/// code.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<ExtractionOutcome> {
    let provider = Provider::from_config(
        &config.provider,
        &config.extractor.model,
        config.extractor.model_timeout(),
    )?;
    let extractor =
        Extractor::initialize_with_limits(config.extractor.clone(), provider, &config.limits)?;

    if args.no_track {
        eprintln!("{}", formatter.info("Tracking disabled; no request row is written"));
        let outcome = extractor.process_document(&args.file).await;
        println!("{}", formatter.outcome(None, &outcome)?);
        return Ok(outcome);
    }

    let tracker = SqliteTracker::new(config.store.resolved_path()?)?;
    let application = args
        .application_id
        .as_deref()
        .unwrap_or(&config.store.application_id);
    let id = tracker.create(application, &document_metadata(&args.file))?;
    info!("[{}] Tracking {}", id, args.file.display());

    let outcome = extractor.process_tracked(id, &args.file, &tracker).await;
    info!("[{}] Processing completed with status: {}", id, outcome.status.as_str());

    println!("{}", formatter.outcome(Some(id), &outcome)?);
    Ok(outcome)
}

/// Metadata stored with the tracker row
pub(crate) fn document_metadata(path: &Path) -> Value {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size = std::fs::metadata(path).ok().map(|m| m.len());

    json!({
        "original_filename": file_name,
        "path": path.display().to_string(),
        "size": size,
    })
}

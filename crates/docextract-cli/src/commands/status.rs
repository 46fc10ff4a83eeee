//! Status command implementation.

use crate::cli::StatusArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docextract_domain::DocumentId;
use docextract_store::SqliteTracker;

/// Execute the status command.
pub fn execute_status(args: StatusArgs, tracker: &SqliteTracker, formatter: &Formatter) -> Result<()> {
    let id = DocumentId::parse(args.id.trim()).map_err(CliError::InvalidInput)?;

    let record = tracker
        .get(id)?
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;

    println!("{}", formatter.record(&record)?);
    Ok(())
}

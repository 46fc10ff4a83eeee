//! History command implementation.

use crate::cli::HistoryArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docextract_store::SqliteTracker;

/// Largest page the history command returns
const MAX_PAGE: usize = 500;

/// Execute the history command.
pub fn execute_history(
    args: HistoryArgs,
    default_application: &str,
    tracker: &SqliteTracker,
    formatter: &Formatter,
) -> Result<()> {
    if args.limit == 0 || args.limit > MAX_PAGE {
        return Err(CliError::InvalidInput(format!(
            "Limit must be between 1 and {}",
            MAX_PAGE
        )));
    }

    let application = args.application_id.as_deref().unwrap_or(default_application);
    let records = tracker.history(application, args.limit, args.offset)?;

    println!("{}", formatter.records(&records)?);
    Ok(())
}

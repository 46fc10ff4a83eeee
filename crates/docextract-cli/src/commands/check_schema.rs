//! Check-schema command implementation.

use crate::cli::CheckSchemaArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use docextract_domain::SchemaCompiler;
use docextract_gatekeeper::StrictnessValidator;

/// Execute the check-schema command.
///
/// Runs the same compile and strictness checks as extractor startup, without
/// loading a tokenizer or contacting a model.
pub fn execute_check_schema(args: CheckSchemaArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let schema_path = args.schema.as_deref().unwrap_or(&config.extractor.schema_path);

    let mut compiler = SchemaCompiler::new();
    if let Some(root) = &config.extractor.app_root {
        compiler = compiler.with_app_root(root.clone());
    }
    let schema = compiler.load(schema_path)?;

    config.limits.validate()?;
    let stats = StrictnessValidator::new(config.limits.clone()).validate(&schema)?;

    println!("{}", formatter.contract(&schema.contract(), &stats)?);
    Ok(())
}

//! Schema lint command handler

use super::utils;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use dynafield_schemas::{
    create_record_schema_validator, SchemaLoader, SchemaValidator, ValidationContext, ValidationErrors,
    ValidationMode,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Descriptor list keys, in the order they are looked up for `--detailed`
const DEFINITION_KEYS: [&str; 4] = ["fieldDefinitions", "field_definitions", "fieldSchema", "field_schema"];

/// Handle the check command
#[instrument(skip(config, output), fields(file = %args.schema.display(), strict = ?args.strict))]
pub async fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("check_command", &format!("file: {}", args.schema.display()));
    let path = utils::resolve_schema_path(&args.schema, config)?;
    output.info(&format!("Checking schema: {}", path.display()))?;

    let document = SchemaLoader::new().load_value(&path)?;
    let mode: ValidationMode = args.strict.unwrap_or(config.validation.mode).into();
    debug!(?mode, "Using validation mode");

    let result = {
        let _validation_timer = Timer::new("schema_validation");
        create_record_schema_validator().validate_with_context(&document, &ValidationContext::new(mode))
    };

    let count = match result {
        Ok(()) => {
            info!("Schema is valid");
            output.success(&format!("✓ Schema is valid ({:?} mode)", mode))?;
            if !output.is_human() {
                output.validation_errors(&ValidationErrors::new())?;
            }
            0
        }
        Err(errors) => {
            warn!(errors = errors.len(), "Schema validation failed");
            output.error("✗ Schema validation failed")?;
            output.validation_errors(&errors)?;
            errors.len()
        }
    };

    if args.detailed {
        output.section("Field Descriptors")?;
        output.table(&["Label", "Kind", "Required"], descriptor_rows(&document))?;
    }

    match count {
        0 => Ok(()),
        count => Err(Error::Validation { count }),
    }
}

/// Rows straight from the raw document, so broken descriptors still show up
fn descriptor_rows(document: &Value) -> Vec<Vec<String>> {
    let descriptors = DEFINITION_KEYS
        .iter()
        .find_map(|key| document.get(*key))
        .and_then(Value::as_array);

    descriptors
        .into_iter()
        .flatten()
        .map(|descriptor| {
            let text = |key: &str| descriptor.get(key).and_then(Value::as_str).unwrap_or("?").to_string();
            let required = descriptor.get("required").and_then(Value::as_bool).unwrap_or(false);
            vec![text("label"), text("__typename"), if required { "yes" } else { "" }.to_string()]
        })
        .collect()
}

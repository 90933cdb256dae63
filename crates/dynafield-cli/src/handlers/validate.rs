//! Record validation command handler

use super::utils::{self, Records};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::OutputWriter;
use dynafield_core::{DumpOptions, DynamicModel, Record, ValidationContext, ValidationErrors, ValidationMode};
use dynafield_schemas::SchemaLoader;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(schema = %args.schema.display(), records = %args.records.display()))]
pub async fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("records: {}", args.records.display()));

    let schema_path = utils::resolve_schema_path(&args.schema, config)?;
    let schema = utils::load_schema_definition(&mut SchemaLoader::new(), &schema_path)?;
    let model = schema.build_record_model()?;
    info!(model = model.name(), fields = model.fields().len(), "Compiled record model");

    let records = utils::load_records(&args.records)?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        let raw = Value::Array(records.clone().into_vec());
        debug!(records = %redaction::redacted(&raw), "Loaded records");
    }
    output.info(&format!(
        "Validating {} record(s) against {}",
        records.len(),
        model.name()
    ))?;

    let strict_keys = args.strict_keys || (config.validation.strict_keys && !args.safe);
    let mode = if strict_keys {
        ValidationMode::Strict
    } else {
        ValidationMode::Lenient
    };

    let single = matches!(records, Records::One(_));
    let outcome = {
        let _validation_timer = Timer::new("record_validation");
        validate_records(&model, records, mode, args.safe)
    };

    match outcome {
        Ok(validated) => {
            let options = DumpOptions {
                enum_as_name: args.enum_names,
                ..if args.full { DumpOptions::full() } else { DumpOptions::default() }
            };
            let dumped: Vec<Value> = validated.iter().map(|record| record.dump(&options)).collect();

            output.success(&format!("✓ {} record(s) valid", dumped.len()))?;
            match dumped.as_slice() {
                [record] if single => output.data(record),
                _ => output.data(&dumped),
            }
        }
        Err(errors) => {
            warn!(errors = errors.len(), "Record validation failed");
            output.error("✗ Record validation failed")?;
            output.validation_errors(&errors)?;
            Err(Error::Validation { count: errors.len() })
        }
    }
}

/// Validate every record; a batch reports paths prefixed with the item index
fn validate_records(
    model: &DynamicModel,
    records: Records,
    mode: ValidationMode,
    safe: bool,
) -> std::result::Result<Vec<Record>, ValidationErrors> {
    match (records, safe) {
        (Records::One(record), true) => model.safe_validate(&record).map(|r| vec![r]),
        (Records::One(record), false) => model
            .validate_with_context(&record, &ValidationContext::new(mode))
            .map(|r| vec![r]),
        (Records::Many(items), false) => model.validate_many_with_mode(&items, mode),
        (Records::Many(items), true) => {
            let mut errors = ValidationErrors::new();
            let mut validated = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match model.safe_validate(item) {
                    Ok(record) => validated.push(record),
                    Err(item_errors) => errors.extend(reroot(item_errors, index)),
                }
            }
            errors.into_result().map(|_| validated)
        }
    }
}

/// `$.a` becomes `$[index].a`
fn reroot(errors: ValidationErrors, index: usize) -> ValidationErrors {
    errors
        .into_iter()
        .map(|mut error| {
            let rest = error.path.strip_prefix('$').unwrap_or(&error.path).to_string();
            error.path = format!("$[{index}]{rest}");
            error
        })
        .collect::<Vec<_>>()
        .into()
}

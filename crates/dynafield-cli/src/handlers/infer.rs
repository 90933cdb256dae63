//! Signature inference command handler

use super::utils;
use crate::cli::InferArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use anyhow::Context;
use dynafield_core::{FieldOverride, FunctionSignature};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Handle the infer command
#[instrument(skip_all)]
pub async fn handle_infer(args: InferArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    let source = match args.signature.strip_prefix('@') {
        Some(path) => {
            let path = std::path::Path::new(path);
            utils::ensure_exists(path)?;
            std::fs::read_to_string(path)
                .with_context(|| format!("reading signature from {}", path.display()))?
        }
        None => args.signature.clone(),
    };

    let signature = FunctionSignature::parse(&source)?;
    let overrides = parse_overrides(&args.overrides, &signature)?;
    debug!(function = %signature.name, params = signature.params.len(), overrides = overrides.len(), "Inferring fields");

    let fields = signature.fields(&overrides)?;
    let model = signature.build_model(args.name.as_deref(), &overrides)?;

    output.section(&format!("{} ({} field(s))", model.name(), fields.len()))?;
    output.table(&utils::FIELD_HEADERS, utils::field_rows(&fields))?;

    let mut document = json!({
        "name": model.name(),
        "fieldDefinitions": fields,
    });
    if args.json_schema {
        document["jsonSchema"] = model.json_schema();
    }
    if output.is_human() {
        output.section("Schema Document")?;
    }
    output.data(&document)
}

/// Overrides keyed by parameter; naming a parameter the signature lacks is an error
fn parse_overrides(raw: &[String], signature: &FunctionSignature) -> Result<HashMap<String, FieldOverride>> {
    let mut overrides = HashMap::with_capacity(raw.len());
    for item in raw {
        let (param, value) = utils::parse_override(item)?;
        if !signature.params.iter().any(|p| p.name == param) {
            return Err(Error::invalid_args(format!(
                "override names '{param}', which is not a parameter of '{}'",
                signature.name
            )));
        }
        if overrides.insert(param.clone(), value).is_some() {
            return Err(Error::invalid_args(format!("parameter '{param}' is overridden twice")));
        }
    }
    Ok(overrides)
}

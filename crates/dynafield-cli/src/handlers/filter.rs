//! Filter compilation and evaluation command handler

use super::utils;
use crate::cli::FilterArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use dynafield_core::expressions::PlaceholderStyle;
use dynafield_core::{FilterExpression, SqlFilterBuilder};
use dynafield_schemas::SchemaParser;
use serde_json::json;
use std::path::Path;
use tracing::{debug, instrument};

/// Handle the filter command
#[instrument(skip(config, output), fields(filter = %args.filter.display()))]
pub async fn handle_filter(args: FilterArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("filter_command", &format!("file: {}", args.filter.display()));
    let expression = load_expression(&args.filter)?;

    match &args.records {
        Some(records_path) => {
            let records = utils::load_records(records_path)?.into_vec();
            let matched = expression.filter(&records)?;
            debug!(total = records.len(), matched = matched.len(), "Evaluated filter");
            output.info(&format!("{} of {} record(s) match", matched.len(), records.len()))?;
            output.data(&matched)
        }
        None => {
            let style = if args.numbered {
                PlaceholderStyle::Numbered
            } else {
                config.sql.placeholders.into()
            };
            let (sql, params) = SqlFilterBuilder::with_style(style).build(&expression)?;
            debug!(?style, params = params.len(), "Compiled filter");

            if output.is_human() {
                output.section("SQL")?;
                output.writeln(&sql)?;
                output.section("Parameters")?;
                output.data(&params)
            } else {
                output.data(&json!({"sql": sql, "params": params}))
            }
        }
    }
}

fn load_expression(path: &Path) -> Result<FilterExpression> {
    utils::ensure_exists(path)?;
    let (value, _) = SchemaParser::new().parse_file(path)?;
    serde_json::from_value(value).map_err(|e| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: format!("a filter expression ({e})"),
    })
}

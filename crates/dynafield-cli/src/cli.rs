//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Dynafield CLI - lint record schemas, validate records and compile filters
///
/// Works on YAML or JSON schema documents holding `__typename`-tagged field
/// descriptors, the same documents the library loads at runtime.
#[derive(Parser, Debug)]
#[command(
    name = "dynafield",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DYNAFIELD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint a record schema document
    Check(CheckArgs),

    /// Validate records against a record schema
    Validate(ValidateArgs),

    /// Print the GraphQL SDL for one or more record schemas
    Sdl(SdlArgs),

    /// Print the JSON Schema of the records a schema accepts
    JsonSchema(JsonSchemaArgs),

    /// Infer field descriptors from a function signature
    Infer(InferArgs),

    /// Compile a filter to SQL or apply it to records
    Filter(FilterArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Schema document (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Lint strictness (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    pub strict: Option<StrictMode>,

    /// Print the loaded document after the result
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Schema document (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// A record or a list of records (JSON or YAML)
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Reject keys the schema does not define
    #[arg(long)]
    pub strict_keys: bool,

    /// Null out invalid fields instead of failing
    #[arg(long, conflicts_with = "strict_keys")]
    pub safe: bool,

    /// Include unset and null fields in the output
    #[arg(long)]
    pub full: bool,

    /// Print enum members by name instead of value
    #[arg(long)]
    pub enum_names: bool,
}

#[derive(Parser, Debug)]
pub struct SdlArgs {
    /// Schema documents or directories of them
    #[arg(value_name = "SCHEMA", required = true)]
    pub schemas: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct JsonSchemaArgs {
    /// Schema document (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
}

#[derive(Parser, Debug)]
pub struct InferArgs {
    /// Signature text such as `fn create(name: String, age: i64 = 18)`, or `@FILE`
    #[arg(value_name = "SIGNATURE")]
    pub signature: String,

    /// Model name (defaults to `<Function>Model`)
    #[arg(long)]
    pub name: Option<String>,

    /// Per-parameter override as `PARAM=JSON`; `{"field": {...}}` replaces the descriptor
    #[arg(long = "override", value_name = "PARAM=JSON")]
    pub overrides: Vec<String>,

    /// Also print the JSON Schema of the inferred model
    #[arg(long)]
    pub json_schema: bool,
}

#[derive(Parser, Debug)]
pub struct FilterArgs {
    /// Filter expression document (JSON or YAML)
    #[arg(value_name = "FILTER")]
    pub filter: PathBuf,

    /// Evaluate against these records instead of compiling to SQL
    #[arg(long, value_name = "RECORDS")]
    pub records: Option<PathBuf>,

    /// Use `$1`-style placeholders instead of `%s`
    #[arg(long, conflicts_with = "records")]
    pub numbered: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// List the configuration files that are consulted, in load order
    Path,
}

#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Write the user config instead of the project config (.dynafield.yaml)
    #[arg(long)]
    pub user: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Lint strictness for schema documents
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictMode {
    /// Every rule, including a full compile
    Strict,
    /// Consistency rules, no compile
    Warn,
    /// Structure only
    Basic,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Colors only on an interactive stdout
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<StrictMode> for dynafield_schemas::ValidationMode {
    fn from(mode: StrictMode) -> Self {
        match mode {
            StrictMode::Strict => dynafield_schemas::ValidationMode::Strict,
            StrictMode::Warn => dynafield_schemas::ValidationMode::Partial,
            StrictMode::Basic => dynafield_schemas::ValidationMode::Basic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["dynafield", "-vv", "check", "people.yaml"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["dynafield", "--quiet", "check", "people.yaml"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_validate_flags() {
        let cli = Cli::parse_from([
            "dynafield",
            "-o",
            "json-pretty",
            "validate",
            "people.yaml",
            "rows.json",
            "--strict-keys",
        ]);
        assert_eq!(cli.output, Some(OutputFormat::JsonPretty));
        match cli.command {
            Commands::Validate(args) => {
                assert!(args.strict_keys);
                assert!(!args.safe);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["dynafield", "validate", "a.yaml", "b.json", "--strict-keys", "--safe"]).is_err());
    }

    #[test]
    fn test_infer_overrides_repeat() {
        let cli = Cli::parse_from([
            "dynafield",
            "infer",
            "fn f(a: i64, b: String)",
            "--override",
            "a={\"required\": true}",
            "--override",
            "b={\"description\": \"B\"}",
        ]);
        let Commands::Infer(args) = cli.command else {
            panic!("expected infer");
        };
        assert_eq!(args.overrides.len(), 2);
    }

    #[test]
    fn test_strict_mode_maps_to_validation_mode() {
        use dynafield_schemas::ValidationMode;
        assert_eq!(ValidationMode::from(StrictMode::Warn), ValidationMode::Partial);
        assert_eq!(ValidationMode::from(StrictMode::Basic), ValidationMode::Basic);
    }
}

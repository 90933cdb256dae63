//! Dynafield CLI - lint record schemas, validate records and compile filters
//!
//! This is the main entry point for the `dynafield` binary.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, !cli.no_color));
            process::exit(e.exit_code());
        }
    };

    control::set_override(cli.use_color() && config.output.color);

    // Dropping the guard flushes the log file, so it lives until exit
    let guard = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let result = run(cli, config).await;
    drop(guard);

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let timer = Timer::new("cli_execution");

    let format = cli.output.unwrap_or(config.output.format);
    let use_color = cli.use_color() && config.output.color;
    let mut output = OutputWriter::new(format, use_color, cli.quiet, cli.verbosity_level());

    tracing::info!(
        ?format,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    let result = match cli.command {
        Commands::Check(args) => handlers::handle_check(args, &config, &mut output).await,
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output).await,
        Commands::Sdl(args) => handlers::handle_sdl(args, &config, &mut output).await,
        Commands::JsonSchema(args) => handlers::handle_json_schema(args, &config, &mut output).await,
        Commands::Infer(args) => handlers::handle_infer(args, &config, &mut output).await,
        Commands::Filter(args) => handlers::handle_filter(args, &config, &mut output).await,
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output).await,
    };

    if result.is_ok() {
        timer.finish();
    }
    result
}

/// Initialize the logging system from flags, config file and environment
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::resolve(cli.verbosity_level(), &config.logging);

    // Quiet mode keeps errors only, and only in the log file if there is one
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = logging_config.file.is_none();
    }

    logging::init_logging(&logging_config)
}

//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use dynafield_schemas::Format;
use serde_json::json;

/// Handle the config command
pub async fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Path => handle_config_path(output),
    }
}

/// Print the merged configuration; the format is independent of `--output`
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let format = match args.format {
        ConfigFormat::Json => Format::Json,
        ConfigFormat::Yaml => Format::Yaml,
    };
    let rendered = config.render(format)?;
    output.writeln(rendered.trim_end())
}

fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = if args.user {
        Config::user_config_path()?
    } else {
        Config::project_config_path()
    };

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))
}

fn handle_config_path(output: &mut OutputWriter) -> Result<()> {
    let paths = Config::default_config_paths();
    if output.is_human() {
        let rows = paths
            .iter()
            .map(|path| {
                let status = if path.is_file() { "found" } else { "" };
                vec![path.display().to_string(), status.to_string()]
            })
            .collect();
        output.table(&["Path", "Status"], rows)
    } else {
        let entries: Vec<_> = paths
            .iter()
            .map(|path| json!({"path": path.display().to_string(), "exists": path.is_file()}))
            .collect();
        output.data(&entries)
    }
}

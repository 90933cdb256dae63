//! SDL and JSON Schema command handlers

use super::utils;
use crate::cli::{JsonSchemaArgs, SdlArgs};
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use dynafield_core::gql::build_schema;
use dynafield_core::RecordSchemaRegistry;
use dynafield_schemas::SchemaLoader;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Handle the sdl command
#[instrument(skip_all, fields(inputs = args.schemas.len()))]
pub async fn handle_sdl(args: SdlArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("sdl_command");
    let registry = collect_registry(args.schemas.as_slice(), config)?;
    output.info(&format!("Building GraphQL schema for {} record schema(s)", registry.len()))?;

    let schema = build_schema(Arc::new(registry))?;
    output.text(&schema.sdl())
}

/// Every schema named by `inputs`, directories expanded
fn collect_registry(inputs: &[impl AsRef<Path>], config: &Config) -> Result<RecordSchemaRegistry> {
    let mut loader = SchemaLoader::new();
    let registry = RecordSchemaRegistry::default();

    for input in inputs {
        let path = utils::resolve_schema_path(input.as_ref(), config)?;
        if path.is_dir() {
            for schema in loader.load_registry(&path)?.list() {
                registry.register(schema.as_ref().clone());
            }
        } else {
            registry.register(utils::load_schema_definition(&mut loader, &path)?);
        }
        debug!(path = %path.display(), total = registry.len(), "collected schemas");
    }

    Ok(registry)
}

/// Handle the json-schema command
#[instrument(skip(config, output), fields(schema = %args.schema.display()))]
pub async fn handle_json_schema(args: JsonSchemaArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let path = utils::resolve_schema_path(&args.schema, config)?;
    let model = utils::load_schema_definition(&mut SchemaLoader::new(), &path)?.build_record_model()?;
    output.data(&model.json_schema())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_registry_mixes_files_and_dirs() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("more");
        fs::create_dir(&nested).unwrap();
        fs::write(
            dir.path().join("book.yaml"),
            "name: Book\nfieldDefinitions:\n  - __typename: StrField\n    label: title\n",
        )
        .unwrap();
        fs::write(
            nested.join("author.json"),
            r#"{"name": "Author", "fieldDefinitions": [{"__typename": "StrField", "label": "name"}]}"#,
        )
        .unwrap();
        fs::write(nested.join("notes.txt"), "not a schema").unwrap();

        let registry =
            collect_registry(&[dir.path().join("book.yaml"), nested], &Config::default()).unwrap();
        let mut names: Vec<_> = registry.list().iter().map(|s| s.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["Author", "Book"]);

        let sdl = build_schema(Arc::new(registry)).unwrap().sdl();
        assert!(sdl.contains("validateAuthor"));
        assert!(sdl.contains("validateBook"));
    }
}

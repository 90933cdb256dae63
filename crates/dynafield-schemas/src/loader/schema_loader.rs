//! Loading record schema documents from disk
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

use crate::loader::{
    cache::{CacheConfig, CacheStats, SchemaCache},
    env::EnvExpander,
    error::{LoaderError, LoaderResult},
    parser::{Format, SchemaParser},
};
use dynafield_core::{DynamicModelDocument, RecordSchemaDefinition, RecordSchemaRegistry};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub cache: CacheConfig,
    /// Expand `${ENV:VAR}` references in string values
    pub allow_env_expansion: bool,
    /// Descend into sub-directories in [`SchemaLoader::load_registry`]
    pub recursive: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            allow_env_expansion: true,
            recursive: false,
        }
    }
}

/// Loads schema documents, caching the parsed form per file
#[derive(Debug, Default)]
pub struct SchemaLoader {
    config: LoaderConfig,
    cache: SchemaCache,
    parser: SchemaParser,
    env: EnvExpander,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            cache: SchemaCache::with_config(config.cache.clone()),
            parser: SchemaParser::new(),
            env: EnvExpander::new(),
            config,
        }
    }

    /// Use `env` for `${ENV:VAR}` lookups
    pub fn with_env(mut self, env: EnvExpander) -> Self {
        self.env = env;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Parsed document as JSON, served from cache when fresh
    pub fn load_value(&mut self, path: &Path) -> LoaderResult<Value> {
        if let Some(entry) = self.cache.get(path)? {
            debug!(path = %path.display(), "schema cache hit");
            return Ok(entry.content);
        }

        let (mut value, format) = self.parser.parse_file(path)?;
        if self.config.allow_env_expansion {
            value = self.env.expand(value, path)?;
        }
        debug!(path = %path.display(), ?format, "parsed schema document");

        self.cache.put(path, value.clone())?;
        Ok(value)
    }

    fn load_typed<T: DeserializeOwned>(&mut self, path: &Path) -> LoaderResult<T> {
        let value = self.load_value(path)?;
        if !value.is_object() {
            return Err(LoaderError::validation_error(
                path.to_path_buf(),
                "document must be an object at the root level".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| LoaderError::validation_error(path.to_path_buf(), e.to_string()))
    }

    /// A record schema definition whose descriptors are known to compile
    pub fn load_record_schema(&mut self, path: &Path) -> LoaderResult<RecordSchemaDefinition> {
        let schema: RecordSchemaDefinition = self.load_typed(path)?;
        schema
            .build_record_model()
            .map_err(|e| LoaderError::schema_error(path.to_path_buf(), e))?;
        Ok(schema)
    }

    /// A tenant model document whose descriptors are known to compile
    pub fn load_document(&mut self, path: &Path) -> LoaderResult<DynamicModelDocument> {
        let document: DynamicModelDocument = self.load_typed(path)?;
        document
            .to_model()
            .map_err(|e| LoaderError::schema_error(path.to_path_buf(), e))?;
        Ok(document)
    }

    /// Every schema document in `dir`, registered by id
    ///
    /// Files with other extensions are skipped; any document that fails to
    /// load aborts the scan.
    pub fn load_registry(&mut self, dir: &Path) -> LoaderResult<RecordSchemaRegistry> {
        let registry = RecordSchemaRegistry::default();
        for path in self.schema_files(dir)? {
            let schema = self.load_record_schema(&path)?;
            if registry.contains(schema.id) {
                warn!(path = %path.display(), id = %schema.id, "schema id registered twice, later file wins");
            }
            registry.register(schema);
        }
        info!(dir = %dir.display(), schemas = registry.len(), "loaded schema registry");
        Ok(registry)
    }

    /// Schema files under `dir`, sorted for a stable load order
    pub fn schema_files(&self, dir: &Path) -> LoaderResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.collect_files(dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn collect_files(&self, dir: &Path, files: &mut Vec<PathBuf>) -> LoaderResult<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| LoaderError::io_error(dir.to_path_buf(), e))?;
        for entry in entries {
            let path = entry.map_err(|e| LoaderError::io_error(dir.to_path_buf(), e))?.path();
            if path.is_dir() {
                if self.config.recursive {
                    self.collect_files(&path, files)?;
                }
            } else if Format::from_path(&path).is_ok() {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Load again, bypassing the cache
    pub fn reload(&mut self, path: &Path) -> LoaderResult<Value> {
        self.cache.remove(path)?;
        self.load_value(path)
    }

    pub fn is_cached(&self, path: &Path) -> LoaderResult<bool> {
        self.cache.contains(path)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

use std::{collections::HashMap, fs, path::Path};

use serde_json::Value;
use tracing::*;

use crate::{SanitizerError, SanitizerResult};

/// Lookup of a connector definition's connection specification (JSON schema).
pub trait ConnectorSpecSource: Send + Sync + 'static {
    fn connection_specification(&self, actor_definition_id: &str) -> Option<Value>;
}

/// Fixed set of specifications, usually loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticSpecSource {
    specs: HashMap<String, Value>,
}

impl StaticSpecSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(mut self, actor_definition_id: impl Into<String>, schema: Value) -> Self {
        self.insert(actor_definition_id, schema);
        self
    }

    pub fn insert(&mut self, actor_definition_id: impl Into<String>, schema: Value) {
        self.specs.insert(actor_definition_id.into(), schema);
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Loads every `<definitionId>.json` file in `dir`. Other files are
    /// skipped.
    pub fn load_dir(dir: &Path) -> SanitizerResult<Self> {
        let io_err = |source| SanitizerError::SpecIo {
            path: dir.to_path_buf(),
            source,
        };

        let mut source = Self::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(definition_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = fs::read_to_string(&path).map_err(|source| SanitizerError::SpecIo {
                path: path.clone(),
                source,
            })?;
            let schema: Value =
                serde_json::from_str(&raw).map_err(|source| SanitizerError::SpecParse {
                    path: path.clone(),
                    source,
                })?;

            debug!(%definition_id, "loaded connector spec");
            source.insert(definition_id, schema);
        }

        Ok(source)
    }
}

impl ConnectorSpecSource for StaticSpecSource {
    fn connection_specification(&self, actor_definition_id: &str) -> Option<Value> {
        self.specs.get(actor_definition_id).cloned()
    }
}

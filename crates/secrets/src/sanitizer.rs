use std::{fmt, sync::Arc};

use async_trait::async_trait;
use conduit_db_types::traits::SecretPersistence;
use serde_json::Value;
use tracing::*;

use crate::{
    ConnectorSpecSource, SanitizerError, SanitizerResult, SecretCoordinate, SecretSanitizer,
};

/// Schema keyword marking a property as secret.
const SECRET_MARKER: &str = "airbyte_secret";

/// Combinators whose branches all describe the same config object.
const COMBINATORS: [&str; 3] = ["oneOf", "anyOf", "allOf"];

/// Sanitizer driven by the connector's connection specification.
pub struct SpecSecretSanitizer {
    specs: Arc<dyn ConnectorSpecSource>,
    persistence: Arc<dyn SecretPersistence>,
}

impl fmt::Debug for SpecSecretSanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecSecretSanitizer").finish_non_exhaustive()
    }
}

impl SpecSecretSanitizer {
    pub fn new(
        specs: Arc<dyn ConnectorSpecSource>,
        persistence: Arc<dyn SecretPersistence>,
    ) -> Self {
        Self { specs, persistence }
    }

    fn sanitize(
        &self,
        schema: &Value,
        config: &mut Value,
        workspace_id: &str,
        replaced: &mut usize,
    ) -> SanitizerResult<()> {
        if is_secret(schema) {
            let payload = match &*config {
                Value::Null => return Ok(()),
                value if SecretCoordinate::is_reference(value) => return Ok(()),
                Value::String(secret) => secret.clone(),
                value => value.to_string(),
            };
            let coord = SecretCoordinate::new_random(workspace_id);
            self.persistence.write_secret(&coord.to_string(), &payload)?;
            *config = coord.to_reference();
            *replaced += 1;
            return Ok(());
        }

        if let (Some(props), Value::Object(fields)) = (schema.get("properties"), &mut *config) {
            if let Some(props) = props.as_object() {
                for (name, prop_schema) in props {
                    if let Some(field) = fields.get_mut(name) {
                        self.sanitize(prop_schema, field, workspace_id, replaced)?;
                    }
                }
            }
        }

        for combinator in COMBINATORS {
            if let Some(branches) = schema.get(combinator).and_then(Value::as_array) {
                for branch in branches {
                    self.sanitize(branch, config, workspace_id, replaced)?;
                }
            }
        }

        if let (Some(items), Value::Array(elems)) = (schema.get("items"), &mut *config) {
            for elem in elems {
                self.sanitize(items, elem, workspace_id, replaced)?;
            }
        }

        Ok(())
    }
}

fn is_secret(schema: &Value) -> bool {
    schema.get(SECRET_MARKER).and_then(Value::as_bool) == Some(true)
}

#[async_trait]
impl SecretSanitizer for SpecSecretSanitizer {
    async fn sanitize_partial_config(
        &self,
        actor_definition_id: &str,
        workspace_id: &str,
        mut config: Value,
    ) -> SanitizerResult<Value> {
        if !config.is_object() {
            return Err(SanitizerError::InvalidConfig);
        }

        let schema = self
            .specs
            .connection_specification(actor_definition_id)
            .ok_or_else(|| SanitizerError::UnknownDefinition(actor_definition_id.to_string()))?;

        let mut replaced = 0;
        self.sanitize(&schema, &mut config, workspace_id, &mut replaced)?;
        debug!(%actor_definition_id, %workspace_id, %replaced, "sanitized partial config");

        Ok(config)
    }

    async fn discard_secrets(&self, coordinates: &[String]) -> SanitizerResult<()> {
        for coordinate in coordinates {
            if !self.persistence.delete_secret(coordinate)? {
                debug!(%coordinate, "secret already gone");
            }
        }
        debug!(count = coordinates.len(), "discarded secrets");
        Ok(())
    }
}

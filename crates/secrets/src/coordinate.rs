use std::fmt;

use serde_json::{Map, Value};
use uuid::Uuid;

/// Key of the object that replaces a redacted value: `{"_secret": "<coordinate>"}`.
pub const SECRET_REF_KEY: &str = "_secret";

/// Address of a stored secret, rendered as
/// `workspace_<workspace>_secret_<uuid>_v<version>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecretCoordinate {
    workspace_id: String,
    secret_id: Uuid,
    version: u32,
}

impl SecretCoordinate {
    /// Fresh coordinate for a new secret in `workspace_id`.
    pub fn new_random(workspace_id: &str) -> Self {
        Self {
            workspace_id: workspace_id.to_string(),
            secret_id: Uuid::new_v4(),
            version: 1,
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// The reference object that stands in for the secret value.
    pub fn to_reference(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(SECRET_REF_KEY.to_string(), Value::String(self.to_string()));
        Value::Object(obj)
    }

    /// Whether `value` is already a reference produced by [`Self::to_reference`].
    pub fn is_reference(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|obj| obj.get(SECRET_REF_KEY).is_some_and(Value::is_string))
    }
}

/// Coordinates named by every reference object inside `value`, in document
/// order.
pub fn secret_references(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_references(value, &mut found);
    found
}

fn collect_references(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(coordinate)) = obj.get(SECRET_REF_KEY) {
                found.push(coordinate.clone());
                return;
            }
            for field in obj.values() {
                collect_references(field, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, found);
            }
        }
        _ => {}
    }
}

impl fmt::Display for SecretCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "workspace_{}_secret_{}_v{}",
            self.workspace_id, self.secret_id, self.version
        )
    }
}

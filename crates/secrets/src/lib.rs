//! Redaction of secret fields from connector configuration.
//!
//! A [`SecretSanitizer`] takes a partial connector configuration and returns
//! a copy where every secret value has been moved to secret persistence and
//! replaced with a coordinate reference.

mod coordinate;
mod errors;
mod sanitizer;
mod spec_source;

use async_trait::async_trait;
use serde_json::Value;

pub use crate::{
    coordinate::{secret_references, SecretCoordinate, SECRET_REF_KEY},
    errors::{SanitizerError, SanitizerResult},
    sanitizer::SpecSecretSanitizer,
    spec_source::{ConnectorSpecSource, StaticSpecSource},
};

#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait SecretSanitizer: Send + Sync + 'static {
    /// Returns `config` with every secret value replaced by a reference.
    async fn sanitize_partial_config(
        &self,
        actor_definition_id: &str,
        workspace_id: &str,
        config: Value,
    ) -> SanitizerResult<Value>;

    /// Deletes secrets stored by an earlier sanitization whose config was
    /// never persisted. Unknown coordinates are ignored.
    async fn discard_secrets(&self, coordinates: &[String]) -> SanitizerResult<()>;
}

//! Wires storage, executor, sanitizer and gateway into the HTTP router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use conduit_commands::{convert::CatalogConverter, CommandGateway, LocalCommandService};
use conduit_common::metrics::OutputStoreMetrics;
use conduit_db_store_sled::{open_sled_backend, SLED_NAME};
use conduit_db_types::{
    stubs::{InMemoryStorageClient, StubCommandDb, StubSecretPersistence},
    traits::{CommandDatabase, SecretPersistence, StorageClient},
};
use conduit_http_api::{router, AppState, AuthPolicy, OpenPolicy, StaticTokenPolicy};
use conduit_output_store::OutputStore;
use conduit_secrets::{SpecSecretSanitizer, StaticSpecSource};
use prometheus::Registry;
use tracing::*;

use crate::config::{AuthConfig, Config, StorageBackend, StorageConfig};

struct Stores {
    storage: Arc<dyn StorageClient>,
    secrets: Arc<dyn SecretPersistence>,
    commands: Arc<dyn CommandDatabase>,
}

fn open_stores(config: &StorageConfig) -> anyhow::Result<Stores> {
    match config.backend {
        StorageBackend::Sled => {
            let backend = open_sled_backend(&config.datadir, SLED_NAME, config.sled_config())
                .context("failed to open sled backend")?;
            info!(datadir = %config.datadir.display(), "opened sled storage");
            Ok(Stores {
                storage: backend.storage_client(),
                secrets: backend.secret_persistence(),
                commands: backend.command_db(),
            })
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, nothing will be persisted");
            Ok(Stores {
                storage: Arc::new(InMemoryStorageClient::new()),
                secrets: Arc::new(StubSecretPersistence::new()),
                commands: Arc::new(StubCommandDb::new()),
            })
        }
    }
}

fn auth_policy(config: &AuthConfig) -> Arc<dyn AuthPolicy> {
    if !config.enabled {
        warn!("auth disabled, all callers are admins");
        return Arc::new(OpenPolicy);
    }
    let tokens = config.tokens.iter().map(|t| (t.token.clone(), t.role));
    Arc::new(StaticTokenPolicy::new(tokens))
}

/// Builds the application router from config.
pub(crate) fn build_app(config: &Config) -> anyhow::Result<Router> {
    let registry = Registry::new();
    let stores = open_stores(&config.storage)?;

    let store_metrics =
        OutputStoreMetrics::register(&registry).context("failed to register store metrics")?;
    let output_store = OutputStore::new(stores.storage, store_metrics);
    let executor = Arc::new(LocalCommandService::new(stores.commands, output_store));

    let specs = match &config.sanitizer.spec_dir {
        Some(dir) => StaticSpecSource::load_dir(dir)
            .with_context(|| format!("failed to load connector specs from {}", dir.display()))?,
        None => {
            warn!("no sanitizer spec_dir configured, inline checks will be rejected");
            StaticSpecSource::new()
        }
    };
    info!(specs = specs.len(), "loaded connector specs");
    let sanitizer = SpecSecretSanitizer::new(Arc::new(specs), stores.secrets);

    let gateway = CommandGateway::new(executor, Arc::new(sanitizer), CatalogConverter::new());
    let state = AppState::new(gateway, auth_policy(&config.auth), registry)
        .context("failed to register http metrics")?;

    Ok(router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;

    #[test]
    fn test_build_app_with_memory_backend() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        config.auth.tokens.push(TokenConfig {
            token: "t".to_string(),
            role: conduit_http_api::Role::Runner,
        });

        assert!(build_app(&config).is_ok());
    }

    #[test]
    fn test_build_app_with_sled_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.datadir = dir.path().to_path_buf();
        config.auth.enabled = false;

        assert!(build_app(&config).is_ok());
        assert!(dir.path().join("sled").exists());
    }

    #[test]
    fn test_missing_spec_dir_fails() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        config.auth.enabled = false;
        config.sanitizer.spec_dir = Some("/nonexistent/conduit-specs".into());

        assert!(build_app(&config).is_err());
    }
}

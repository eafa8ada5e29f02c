use std::{fmt, sync::Arc};

use axum::http::HeaderMap;
use conduit_commands::CommandGateway;
use conduit_common::metrics::HttpMetrics;
use prometheus::Registry;

use crate::{authorize, ApiError, AuthPolicy, Role};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub(crate) gateway: CommandGateway,
    pub(crate) auth: Arc<dyn AuthPolicy>,
    pub(crate) registry: Registry,
    pub(crate) http_metrics: HttpMetrics,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Registers the HTTP metric families into `registry`, which is also the
    /// registry served on `/metrics`.
    pub fn new(
        gateway: CommandGateway,
        auth: Arc<dyn AuthPolicy>,
        registry: Registry,
    ) -> Result<Self, prometheus::Error> {
        let http_metrics = HttpMetrics::register(&registry)?;
        Ok(Self {
            gateway,
            auth,
            registry,
            http_metrics,
        })
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.http_metrics
    }

    pub(crate) fn authorize(&self, headers: &HeaderMap, required: Role) -> Result<Role, ApiError> {
        authorize(self.auth.as_ref(), headers, required)
    }
}

//! Ambient plumbing shared by every Conduit crate: logging setup and the
//! Prometheus metric families the gateway exports.

pub mod logging;
pub mod metrics;

//! The command API: run, cancel and inspect check and discover commands.
//!
//! [`CommandGateway`] validates requests, sanitizes inline connector
//! configuration and maps executor results to wire responses.
//! [`CommandService`] is the executor seam; [`LocalCommandService`] is the
//! in-process implementation backed by the embedded database.

pub mod api;
pub mod convert;
mod errors;
mod gateway;
mod local;
mod service;

pub use crate::{
    errors::{CommandApiError, CommandApiResult, ExecutorError, ExecutorResult},
    gateway::CommandGateway,
    local::LocalCommandService,
    service::CommandService,
};
#[cfg(any(test, feature = "test-utils"))]
pub use crate::service::MockCommandService;

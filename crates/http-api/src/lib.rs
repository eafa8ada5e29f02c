//! HTTP surface of the command API.
//!
//! Every command endpoint is a `POST` with a JSON body under
//! `/api/v1/commands`. Callers authenticate with a bearer token which the
//! configured [`AuthPolicy`] resolves to a [`Role`]. `/health` and
//! `/metrics` are unauthenticated.

mod auth;
mod errors;
mod handlers;
mod middleware;
mod router;
mod state;

pub use crate::{
    auth::{authorize, AuthPolicy, OpenPolicy, Role, StaticTokenPolicy},
    errors::ApiError,
    router::{router, serve},
    state::AppState,
};

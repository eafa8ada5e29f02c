//! Bearer token authentication and role checks.

use std::{collections::HashMap, fmt, str::FromStr};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::ApiError;

/// Workspace roles, ordered by privilege.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Reader,
    Runner,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Runner => "runner",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Role::Reader),
            "runner" => Ok(Role::Runner),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Resolves a caller's bearer token to the role it grants.
pub trait AuthPolicy: Send + Sync + 'static {
    /// `None` means the caller is not authenticated.
    fn resolve(&self, token: Option<&str>) -> Option<Role>;
}

/// Grants [`Role::Admin`] to everyone. Used when auth is disabled.
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenPolicy;

impl AuthPolicy for OpenPolicy {
    fn resolve(&self, _token: Option<&str>) -> Option<Role> {
        Some(Role::Admin)
    }
}

/// Fixed token to role table loaded from config.
#[derive(Clone, Default)]
pub struct StaticTokenPolicy {
    tokens: HashMap<String, Role>,
}

impl fmt::Debug for StaticTokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are credentials.
        f.debug_struct("StaticTokenPolicy")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl StaticTokenPolicy {
    pub fn new(tokens: impl IntoIterator<Item = (String, Role)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>, role: Role) -> Self {
        self.tokens.insert(token.into(), role);
        self
    }
}

impl AuthPolicy for StaticTokenPolicy {
    fn resolve(&self, token: Option<&str>) -> Option<Role> {
        token.and_then(|t| self.tokens.get(t).copied())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
        .filter(|t| !t.is_empty())
}

/// Checks that the caller holds at least `required`.
pub fn authorize(
    policy: &dyn AuthPolicy,
    headers: &HeaderMap,
    required: Role,
) -> Result<Role, ApiError> {
    let role = policy
        .resolve(bearer_token(headers))
        .ok_or(ApiError::Unauthorized)?;
    if role < required {
        return Err(ApiError::Forbidden { required });
    }
    Ok(role)
}

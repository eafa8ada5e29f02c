use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use conduit_commands::CommandApiError;
use serde_json::json;
use thiserror::Error;
use tracing::*;

use crate::Role;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or unrecognized credentials")]
    Unauthorized,

    #[error("requires the {required} role")]
    Forbidden { required: Role },

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("failed to encode metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error(transparent)]
    Command(#[from] CommandApiError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::MalformedBody(_) => "BAD_REQUEST",
            ApiError::Metrics(_) => "INTERNAL_ERROR",
            ApiError::Command(e) => e.code(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Command(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Command(CommandApiError::Executor(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Command(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), err = %self, "request failed");
        } else {
            debug!(code = self.code(), err = %self, "request rejected");
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use conduit_commands::ExecutorError;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden {
                required: Role::Runner
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(CommandApiError::validation("bad")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CommandApiError::from(ExecutorError::Unavailable(
                "down".into()
            )))
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_code_passes_through() {
        let err = ApiError::from(CommandApiError::validation("bad"));
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::models::iso_timestamp;

pub type AppResult<T> = Result<T, AppError>;

/// Request-level failures. When one of these is returned no item of the
/// batch has been dispatched.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("update script URL is not configured")]
    ScriptNotConfigured,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedBody(_) | AppError::ScriptNotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let body = if status.is_client_error() {
            warn!(%status, error = %message, "Rejected request");
            json!({ "error": message })
        } else {
            error!(%status, error = %message, "Request failed");
            json!({ "error": message, "timestamp": iso_timestamp() })
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let err = AppError::BadRequest("nope".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn malformed_body_is_a_server_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            AppError::from(parse_err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_script_is_a_server_error() {
        let response = AppError::ScriptNotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Mapping of routing failures to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use multiroute_core::Error as CoreError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Graph not loaded. Please wait for system initialization.")]
    NotReady,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NoRoute(String),
    #[error("Request timed out")]
    Timeout,
    #[error("{0}")]
    Internal(String),
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoRoute(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotReady => "not_ready",
            ApiError::BadRequest(_) => "invalid_request",
            ApiError::NoRoute(_) => "no_route",
            ApiError::Timeout => "timeout",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidCoordinate(_) => ApiError::BadRequest(e.to_string()),
            CoreError::NoPathFound { .. } => ApiError::NoRoute(e.to_string()),
            // NodeNotFound only happens on a graph without coordinates
            _ => ApiError::Internal(format!("Error calculating route: {e}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, "{self}");
        } else {
            warn!(%status, "{self}");
        }

        let body = Json(ErrorBody {
            detail: self.to_string(),
            kind: self.kind(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use multiroute_core::model::{Layer, NodeKey};

    use super::*;

    #[test]
    fn core_errors_map_to_status_codes() {
        let no_path = CoreError::NoPathFound {
            from: NodeKey::new(1, Layer::Walk),
            to: NodeKey::new(2, Layer::Car),
        };
        assert_eq!(ApiError::from(no_path).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(CoreError::InvalidCoordinate("latitude 91".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CoreError::NodeNotFound { lat: 0.0, lon: 0.0 }).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

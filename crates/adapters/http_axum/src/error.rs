//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hostflow_domain::error::{HostflowError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HostflowError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(HostflowError);

impl From<HostflowError> for ApiError {
    fn from(err: HostflowError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HostflowError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HostflowError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HostflowError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            HostflowError::ExternalService(err) => {
                tracing::warn!(error = %err, "suggestion generator failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            HostflowError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            HostflowError::Execution(err) => {
                tracing::error!(error = %err, "execution error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use hostflow_domain::error::{ExternalServiceError, NotFoundError};

    use super::*;

    fn status_of(err: impl Into<HostflowError>) -> StatusCode {
        ApiError(err.into()).into_response().status()
    }

    #[test]
    fn should_map_each_error_kind_to_its_status() {
        assert_eq!(status_of(ValidationError::EmptyName), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(NotFoundError {
                entity: "Rule",
                id: "x".to_string(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ExternalServiceError::EmptyResponse),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(HostflowError::Storage(Box::new(std::io::Error::other("disk")))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

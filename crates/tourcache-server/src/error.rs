use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tourcache_core::Error;

/// JSON error body returned by every failing handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unknown_domain(segment: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "UNKNOWN_COLLECTION",
            format!("Unknown collection: {}", segment),
        )
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::MissingParameter(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "MISSING_PARAMETER", err.to_string())
            }
            Error::InvalidArgument { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", err.to_string())
            }
            Error::NotFound { .. } => ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
            Error::UpstreamAuth(_) | Error::UpstreamFetch { .. } | Error::Client(_) => {
                tracing::error!(error = %err, cause = ?std::error::Error::source(&err), "Request failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = ErrorResponse {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(payload)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

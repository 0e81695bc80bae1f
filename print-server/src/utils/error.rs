//! Unified error handling
//!
//! Every failure leaves the server as `{ "ok": false, "error": "..." }`.
//!
//! | Source | Status |
//! |--------|--------|
//! | Request validation, bad image, missing printer name | 400 |
//! | Malformed JSON body | 400 |
//! | Body over `MAX_BODY_BYTES` | 413 |
//! | Request over `REQUEST_TIMEOUT_MS` | 408 |
//! | Raw printing unavailable on this platform | 501 |
//! | Device/system failure | 500 |

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thermal_printer::PrintError;
use tracing::{error, warn};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid request (400)
    #[error("{0}")]
    Validation(String),

    /// Body could not be extracted (bad JSON, wrong content type, too large)
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// Encoding or printing failed
    #[error(transparent)]
    Print(#[from] PrintError),

    /// Internal error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::Print(PrintError::UnsupportedPlatform) => StatusCode::NOT_IMPLEMENTED,
            AppError::Print(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            AppError::Print(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        } else {
            warn!(status = %status, error = %self, "request rejected");
        }

        let body = ErrorBody {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Type mismatches are plain bad requests here
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            other => other,
        };
        Self::Rejected {
            status,
            message: rejection.body_text(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Give failures produced outside the handlers the JSON error body
///
/// Covers the timeout layer, which answers with an empty body.
pub async fn json_error_fallback(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }

    let body = ErrorBody {
        ok: false,
        error: status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermal_printer::SystemCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("threshold").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(PrintError::EmptyInput).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(PrintError::UnsupportedPlatform).status(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            AppError::from(PrintError::BeginPage {
                code: SystemCode(6)
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Rejected {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "length limit exceeded".into()
            }
            .status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[tokio::test]
    async fn test_fallback_wraps_plain_errors() {
        let plain = (StatusCode::REQUEST_TIMEOUT, "").into_response();
        let response = json_error_fallback(plain).await;

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_fallback_keeps_success_and_json() {
        let ok = json_error_fallback("ok".into_response()).await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert!(ok.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let app = json_error_fallback(AppError::validation("bad").into_response()).await;
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
    }
}

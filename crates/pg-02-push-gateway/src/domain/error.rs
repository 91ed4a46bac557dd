//! Gateway error types and their HTTP representation.
//!
//! | Error | Status | Body |
//! |-------|--------|------|
//! | parse failure | 422 | `{"detail": [{"type", "loc": ["body", ..], "msg"}, ..]}` |
//! | rejection | 400 | `{"detail": "<reason>"}` |
//! | request timeout | 504 | `{"detail": "Request timed out"}` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pg_01_push_verification::{
    Acknowledgement, FieldViolation, ReceiveError, Rejection, ViolationKind,
};
use serde::Serialize;

/// Location prefix of every body violation.
const BODY_LOC: &str = "body";

/// One entry of a 422 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetail {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub loc: Vec<String>,
    pub msg: String,
}

impl From<FieldViolation> for ValidationDetail {
    fn from(violation: FieldViolation) -> Self {
        let mut loc = Vec::with_capacity(violation.loc.len() + 1);
        loc.push(BODY_LOC.to_string());
        loc.extend(violation.loc);
        Self {
            kind: violation.kind,
            loc,
            msg: violation.message,
        }
    }
}

/// Error returned to the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The body failed to parse
    Validation(Vec<ValidationDetail>),
    /// The message was refused
    Rejected(Rejection),
    /// The request exceeded its deadline
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<ReceiveError> for ApiError {
    fn from(error: ReceiveError) -> Self {
        match error {
            ReceiveError::Invalid(e) => ApiError::Validation(
                e.violations.into_iter().map(ValidationDetail::from).collect(),
            ),
            ReceiveError::Rejected(rejection) => ApiError::Rejected(rejection),
        }
    }
}

#[derive(Serialize)]
struct DetailBody<T: Serialize> {
    detail: T,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(details) => {
                (status, Json(DetailBody { detail: details })).into_response()
            }
            ApiError::Rejected(rejection) => (
                status,
                Json(DetailBody {
                    detail: rejection.reason(),
                }),
            )
                .into_response(),
            ApiError::Timeout => (
                status,
                Json(DetailBody {
                    detail: "Request timed out",
                }),
            )
                .into_response(),
        }
    }
}

/// Body of a 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl From<Acknowledgement> for SuccessResponse {
    fn from(ack: Acknowledgement) -> Self {
        Self {
            status: "success",
            message: ack.message(),
        }
    }
}

/// Gateway-level errors (not returned to the publisher)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// The server is not running
    #[error("gateway not started")]
    NotStarted,

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

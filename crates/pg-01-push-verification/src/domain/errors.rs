//! # Push Verification Errors
//!
//! Error taxonomy for the receive pipeline.
//!
//! Parse errors carry every field violation back to the caller. Certificate and
//! signature failures keep their sub-step for logging but leave the service
//! as a single [`Rejection::InvalidSignature`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Parse Errors
// =============================================================================

/// Machine-readable violation category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Body is not valid JSON
    JsonInvalid,
    /// Body is JSON but not an object
    ModelType,
    /// Required field absent
    Missing,
    /// Field present but not a string
    StringType,
    /// String shorter than allowed
    StringTooShort,
    /// Field is not an absolute URL
    UrlParsing,
    /// URL scheme is not `http`/`https`
    UrlScheme,
    /// `Type` value is not a known message type
    UnionTagInvalid,
    /// `Type` field absent
    UnionTagNotFound,
}

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Violation category
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    /// Field path inside the message (publisher field names)
    pub loc: Vec<String>,
    /// Human-readable explanation
    #[serde(rename = "msg")]
    pub message: String,
}

impl FieldViolation {
    pub fn new(kind: ViolationKind, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            loc: field.map(|f| vec![f.to_string()]).unwrap_or_default(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loc.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.loc.join("."), self.message)
        }
    }
}

/// Raw input could not be decoded into a push message.
///
/// Always holds at least one violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid push message ({} violation(s)): {}", .violations.len(), summarize(.violations))]
pub struct ParseError {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Certificate / Signature Errors
// =============================================================================

/// Errors retrieving the publisher's signing certificate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    /// URL scheme is not a secure transport
    #[error("insecure certificate URL scheme: {0}")]
    InsecureScheme(String),

    /// URL host is not an allow-listed publisher domain
    #[error("untrusted certificate origin: {0}")]
    UntrustedOrigin(String),

    /// Network failure, timeout or non-success status
    #[error("certificate unreachable: {0}")]
    Unreachable(String),

    /// Body is not a PEM X.509 certificate with an RSA key
    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),
}

impl FetchError {
    /// Metric label for this failure.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            FetchError::InsecureScheme(_) | FetchError::UntrustedOrigin(_) => "untrusted",
            FetchError::Unreachable(_) => "unreachable",
            FetchError::MalformedCertificate(_) => "malformed",
        }
    }
}

/// Why a message failed authenticity checks.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The signing certificate could not be obtained
    #[error(transparent)]
    Certificate(#[from] FetchError),

    /// `Signature` is not valid base64
    #[error("signature is not valid base64")]
    MalformedSignature,

    /// Signature does not match the canonical string under the certificate key
    #[error("signature verification failed")]
    SignatureMismatch,
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// A well-formed message refused by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Claimed topic is not the configured topic
    #[error("Invalid TopicArn")]
    InvalidTopic,

    /// Any certificate or signature failure
    #[error("Invalid signature")]
    InvalidSignature,

    /// Subscription confirmation endpoint refused, unreachable or disallowed
    #[error("Invalid SubscribeURL")]
    InvalidSubscribeUrl,
}

impl Rejection {
    /// Public reason string. Never names the expected topic or the failed sub-step.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::InvalidTopic => "Invalid TopicArn",
            Rejection::InvalidSignature => "Invalid signature",
            Rejection::InvalidSubscribeUrl => "Invalid SubscribeURL",
        }
    }

    /// Metric label for this rejection.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Rejection::InvalidTopic => "invalid_topic",
            Rejection::InvalidSignature => "invalid_signature",
            Rejection::InvalidSubscribeUrl => "invalid_subscribe_url",
        }
    }
}

/// Error from the full receive pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReceiveError {
    /// Body could not be parsed
    #[error(transparent)]
    Invalid(#[from] ParseError),

    /// Message parsed but was refused
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

//! # Domain Entities
//!
//! Core data structures for push message verification.
//!
//! A [`PushMessage`] is built once per inbound request from untrusted input,
//! never mutated, and dropped when the request completes.

use super::errors::{FetchError, VerificationError};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use std::fmt;
use url::Url;

/// Upper bound for a PEM signing certificate body.
pub const MAX_CERTIFICATE_BYTES: usize = 16 * 1024;

// =============================================================================
// URL Types
// =============================================================================

/// Reasons a URL field fails validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlViolation {
    /// Not an absolute URL, or no host
    Parsing(String),
    /// Scheme other than `http`/`https`
    Scheme(String),
}

/// An absolute `http`/`https` URL that remembers the exact text it was parsed from.
///
/// The publisher signs the text it sent, so canonicalization must use
/// [`ValidatedUrl::as_str`] and never the normalized form of [`ValidatedUrl::url`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedUrl {
    raw: String,
    parsed: Url,
}

impl ValidatedUrl {
    /// Parse and validate a URL string.
    pub fn parse(raw: &str) -> Result<Self, UrlViolation> {
        let parsed = Url::parse(raw).map_err(|e| UrlViolation::Parsing(e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(UrlViolation::Scheme(other.to_string())),
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(UrlViolation::Parsing("empty host".to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    /// The URL text exactly as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed URL, for network calls and host checks.
    pub fn url(&self) -> &Url {
        &self.parsed
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// =============================================================================
// Message Types
// =============================================================================

/// The `Type` discriminator of a push message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    Notification,
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
}

impl MessageType {
    /// All discriminator values, in declaration order.
    pub const ALL: [MessageType; 3] = [
        MessageType::Notification,
        MessageType::SubscriptionConfirmation,
        MessageType::UnsubscribeConfirmation,
    ];

    /// Wire value of the discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Notification => "Notification",
            MessageType::SubscriptionConfirmation => "SubscriptionConfirmation",
            MessageType::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }

    /// Look up a discriminator by its wire value (case-sensitive).
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every message variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBase {
    /// `MessageId`, never empty
    pub message_id: String,
    /// `TopicArn`, the topic the message claims to originate from
    pub topic_identifier: String,
    /// `Timestamp` (ISO-8601 text, kept verbatim)
    pub timestamp: String,
    /// `SignatureVersion` (`"1"` → SHA-1, `"2"` → SHA-256)
    pub signature_version: String,
    /// `Signature`, base64 text
    pub signature: String,
    /// `SigningCertURL`
    pub signing_cert_url: ValidatedUrl,
    /// `Message`
    pub message_body: String,
}

/// An application notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub base: MessageBase,
    /// `Subject`, when the publisher sent one
    pub subject: Option<String>,
}

/// A subscribe or unsubscribe confirmation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionConfirmation {
    pub base: MessageBase,
    /// `SubscribeURL`, visited to confirm the subscription
    pub subscribe_url: ValidatedUrl,
    /// `Token`
    pub token: String,
}

/// Unsubscribe confirmations carry exactly the subscription shape.
pub type UnsubscribeConfirmation = SubscriptionConfirmation;

/// A parsed push message. The variant is selected by the `Type` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushMessage {
    Notification(Notification),
    SubscriptionConfirmation(SubscriptionConfirmation),
    UnsubscribeConfirmation(UnsubscribeConfirmation),
}

impl PushMessage {
    /// Shared base fields.
    pub fn base(&self) -> &MessageBase {
        match self {
            PushMessage::Notification(n) => &n.base,
            PushMessage::SubscriptionConfirmation(s) | PushMessage::UnsubscribeConfirmation(s) => {
                &s.base
            }
        }
    }

    /// The discriminator of this variant.
    pub fn message_type(&self) -> MessageType {
        match self {
            PushMessage::Notification(_) => MessageType::Notification,
            PushMessage::SubscriptionConfirmation(_) => MessageType::SubscriptionConfirmation,
            PushMessage::UnsubscribeConfirmation(_) => MessageType::UnsubscribeConfirmation,
        }
    }

    pub fn message_id(&self) -> &str {
        &self.base().message_id
    }

    pub fn topic_identifier(&self) -> &str {
        &self.base().topic_identifier
    }
}

// =============================================================================
// Certificate Types
// =============================================================================

/// The publisher's signing certificate, reduced to what verification needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningCertificate {
    /// Where the certificate was served from
    pub source_url: String,
    /// RSA public key from the certificate's SubjectPublicKeyInfo
    pub public_key: RsaPublicKey,
}

impl SigningCertificate {
    /// Parse a PEM-encoded X.509 certificate carrying an RSA public key.
    ///
    /// # Errors
    /// * `MalformedCertificate` if the body is oversized, not PEM, not X.509,
    ///   or the key is not RSA
    pub fn from_pem(pem: &[u8], source_url: impl Into<String>) -> Result<Self, FetchError> {
        if pem.len() > MAX_CERTIFICATE_BYTES {
            return Err(FetchError::MalformedCertificate(format!(
                "certificate too large: {} bytes (max {MAX_CERTIFICATE_BYTES})",
                pem.len()
            )));
        }

        let (_, pem) = x509_parser::pem::parse_x509_pem(pem)
            .map_err(|e| FetchError::MalformedCertificate(format!("invalid PEM: {e}")))?;
        let certificate = pem
            .parse_x509()
            .map_err(|e| FetchError::MalformedCertificate(format!("invalid X.509: {e}")))?;
        let public_key = RsaPublicKey::from_public_key_der(certificate.public_key().raw)
            .map_err(|e| FetchError::MalformedCertificate(format!("not an RSA key: {e}")))?;

        Ok(Self {
            source_url: source_url.into(),
            public_key,
        })
    }
}

// =============================================================================
// Verification Result
// =============================================================================

/// Outcome of signature verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether the message is authentic
    pub authentic: bool,
    /// Why verification failed (only for logs, never returned to the caller)
    pub reason: Option<VerificationError>,
}

impl VerificationResult {
    /// Create a successful verification result.
    pub fn authentic() -> Self {
        Self {
            authentic: true,
            reason: None,
        }
    }

    /// Create a failed verification result.
    pub fn rejected(reason: VerificationError) -> Self {
        Self {
            authentic: false,
            reason: Some(reason),
        }
    }
}

// =============================================================================
// Dispatch Outcome
// =============================================================================

/// Successful dispatch result, one per lifecycle role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Notification delivered to the downstream consumer
    MessageReceived,
    /// Subscription confirmed with the publisher
    SubscriptionConfirmed,
    /// Unsubscribe acknowledged
    UnsubscribeConfirmed,
}

impl Acknowledgement {
    /// Human-readable status message returned to the publisher.
    pub fn message(&self) -> &'static str {
        match self {
            Acknowledgement::MessageReceived => "Message received",
            Acknowledgement::SubscriptionConfirmed => "Subscription confirmed",
            Acknowledgement::UnsubscribeConfirmed => "Unsubscribe confirmed",
        }
    }
}

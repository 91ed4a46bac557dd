//! # Push Verification Subsystem (PG-01)
//!
//! Authenticates and dispatches push notifications delivered by a pub/sub
//! publisher over HTTP.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): message model, parser, canonical string,
//!   signature check, topic and certificate-origin policies. No I/O.
//! - **Ports Layer** (`ports/`): `PushReceiverApi` inbound,
//!   `CertificateSource` and `SubscriptionConfirmer` outbound
//! - **Adapters Layer** (`adapters/`): `reqwest` fetcher and confirmer, TTL cache
//! - **Service Layer** (`service.rs`): the per-request pipeline
//!
//! ## Security Notes
//!
//! - Signatures are RSA PKCS#1 v1.5; `SignatureVersion` `"2"` selects SHA-256,
//!   anything else SHA-1
//! - Certificates are only fetched from allow-listed hosts (exact host or
//!   subdomain match), over HTTPS, without following redirects
//! - The X.509 chain of trust is not validated; trust rests on the serving host
//! - Every certificate or signature failure surfaces as the same rejection

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

// Re-export public API
pub use adapters::{CachingCertificateSource, HttpCertificateFetcher, HttpSubscriptionConfirmer};
pub use domain::canonical::canonical_string;
pub use domain::certificate::{CertificatePolicy, DEFAULT_ALLOWED_DOMAIN};
pub use domain::entities::{
    Acknowledgement, MessageBase, MessageType, Notification, PushMessage, SigningCertificate,
    SubscriptionConfirmation, UnsubscribeConfirmation, ValidatedUrl, VerificationResult,
};
pub use domain::errors::{
    FetchError, FieldViolation, ParseError, ReceiveError, Rejection, VerificationError,
    ViolationKind,
};
pub use domain::parser::parse;
pub use domain::signature::{DigestAlgorithm, SignatureVerifier};
pub use domain::topic::TopicAuthorizer;
pub use ports::inbound::PushReceiverApi;
pub use ports::outbound::{CertificateSource, SubscriptionConfirmer};
pub use service::PushVerificationService;

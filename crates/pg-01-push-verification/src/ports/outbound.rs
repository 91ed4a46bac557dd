//! # Outbound Ports (Driven Ports / SPI)
//!
//! The two network collaborators of the pipeline. Both are constructed once at
//! process start and shared by every request.

use crate::domain::entities::{SigningCertificate, ValidatedUrl};
use crate::domain::errors::FetchError;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of publisher signing certificates.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// Retrieve and parse the certificate served at `url`.
    ///
    /// # Errors
    /// * `FetchError::InsecureScheme` / `FetchError::UntrustedOrigin` - refused without network I/O
    /// * `FetchError::Unreachable` - network error, timeout or non-success status
    /// * `FetchError::MalformedCertificate` - body is not a PEM RSA certificate
    async fn fetch(&self, url: &ValidatedUrl) -> Result<SigningCertificate, FetchError>;
}

/// Finalizes a subscription by visiting the publisher's confirmation URL.
#[async_trait]
pub trait SubscriptionConfirmer: Send + Sync {
    /// Returns `true` iff the endpoint answered with a success status.
    /// Network failures resolve to `false`.
    async fn confirm(&self, url: &ValidatedUrl) -> bool;
}

#[async_trait]
impl<T: CertificateSource + ?Sized> CertificateSource for Arc<T> {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<SigningCertificate, FetchError> {
        (**self).fetch(url).await
    }
}

#[async_trait]
impl<T: SubscriptionConfirmer + ?Sized> SubscriptionConfirmer for Arc<T> {
    async fn confirm(&self, url: &ValidatedUrl) -> bool {
        (**self).confirm(url).await
    }
}

//! # HTTP Adapters
//!
//! `reqwest`-backed implementations of the outbound ports.
//!
//! Each adapter owns one pooled client built at start. Every call carries its
//! own deadline, and dropping the calling future aborts the request in flight.

use crate::domain::certificate::CertificatePolicy;
use crate::domain::entities::{SigningCertificate, ValidatedUrl, MAX_CERTIFICATE_BYTES};
use crate::domain::errors::FetchError;
use crate::ports::outbound::{CertificateSource, SubscriptionConfirmer};
use async_trait::async_trait;
use pg_telemetry::{metric_inc, CERTIFICATE_FETCHES, SUBSCRIPTION_CONFIRMATIONS};
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default certificate fetch deadline.
pub const DEFAULT_CERTIFICATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default subscription confirmation deadline.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Certificate Fetcher
// =============================================================================

/// Downloads signing certificates from allow-listed publisher hosts.
pub struct HttpCertificateFetcher {
    client: Client,
    policy: CertificatePolicy,
    timeout: Duration,
}

impl HttpCertificateFetcher {
    /// Create a fetcher. Redirects are never followed, so a trusted host cannot
    /// bounce the request to an untrusted one.
    pub fn new(policy: CertificatePolicy, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            policy,
            timeout,
        })
    }

    pub fn policy(&self) -> &CertificatePolicy {
        &self.policy
    }

    async fn download(&self, url: &ValidatedUrl) -> Result<SigningCertificate, FetchError> {
        let mut response = self
            .client
            .get(url.url().clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Unreachable(format!("status {status}")));
        }

        if response
            .content_length()
            .is_some_and(|len| len > MAX_CERTIFICATE_BYTES as u64)
        {
            return Err(FetchError::MalformedCertificate(
                "certificate too large".to_string(),
            ));
        }

        // Content-Length is absent on chunked responses; enforce the cap while reading
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?
        {
            if body.len() + chunk.len() > MAX_CERTIFICATE_BYTES {
                return Err(FetchError::MalformedCertificate(
                    "certificate too large".to_string(),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        SigningCertificate::from_pem(&body, url.as_str())
    }
}

#[async_trait]
impl CertificateSource for HttpCertificateFetcher {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<SigningCertificate, FetchError> {
        if let Err(e) = self.policy.check(url.url()) {
            warn!(cert_url = %url, error = %e, "Refusing signing certificate URL");
            metric_inc!(CERTIFICATE_FETCHES, &[e.outcome_label()]);
            return Err(e);
        }

        match self.download(url).await {
            Ok(certificate) => {
                debug!(cert_url = %url, "Fetched signing certificate");
                metric_inc!(CERTIFICATE_FETCHES, &["fetched"]);
                Ok(certificate)
            }
            Err(e) => {
                error!(cert_url = %url, error = %e, "Signing certificate fetch failed");
                metric_inc!(CERTIFICATE_FETCHES, &[e.outcome_label()]);
                Err(e)
            }
        }
    }
}

// =============================================================================
// Subscription Confirmer
// =============================================================================

/// Confirms subscriptions with a GET to the publisher's `SubscribeURL`.
pub struct HttpSubscriptionConfirmer {
    client: Client,
    timeout: Duration,
}

impl HttpSubscriptionConfirmer {
    /// Create a confirmer. Only a direct 2xx confirms; a redirect is reported
    /// as a refusal and never followed to another host.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl SubscriptionConfirmer for HttpSubscriptionConfirmer {
    async fn confirm(&self, url: &ValidatedUrl) -> bool {
        let result = self
            .client
            .get(url.url().clone())
            .timeout(self.timeout)
            .send()
            .await;

        let confirmed = match result {
            Ok(response) if response.status().is_success() => {
                info!(subscribe_url = %url, status = %response.status(), "Subscription confirmed");
                true
            }
            Ok(response) => {
                warn!(subscribe_url = %url, status = %response.status(), "Subscription confirmation refused");
                false
            }
            Err(e) => {
                warn!(subscribe_url = %url, error = %e, "Subscription confirmation failed");
                false
            }
        };

        let outcome = if confirmed { "confirmed" } else { "failed" };
        metric_inc!(SUBSCRIPTION_CONFIRMATIONS, &[outcome]);
        confirmed
    }
}

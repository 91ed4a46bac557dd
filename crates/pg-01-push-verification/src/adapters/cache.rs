//! # Certificate Cache
//!
//! Time-bounded cache decorating any [`CertificateSource`], keyed by the
//! certificate URL text. Only successful fetches are stored. Entries are never
//! served past their TTL.

use crate::domain::entities::{SigningCertificate, ValidatedUrl};
use crate::domain::errors::FetchError;
use crate::ports::outbound::CertificateSource;
use async_trait::async_trait;
use parking_lot::RwLock;
use pg_telemetry::{metric_inc, CERTIFICATE_FETCHES};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub struct CachingCertificateSource<C> {
    inner: C,
    ttl: Duration,
    entries: RwLock<HashMap<String, (SigningCertificate, Instant)>>,
}

impl<C: CertificateSource> CachingCertificateSource<C> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn lookup(&self, key: &str) -> Option<SigningCertificate> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.ttl)
            .map(|(certificate, _)| certificate.clone())
    }

    fn store(&self, key: String, certificate: SigningCertificate) {
        let mut entries = self.entries.write();
        let ttl = self.ttl;
        entries.retain(|_, (_, fetched_at)| fetched_at.elapsed() < ttl);
        entries.insert(key, (certificate, Instant::now()));
    }
}

#[async_trait]
impl<C: CertificateSource> CertificateSource for CachingCertificateSource<C> {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<SigningCertificate, FetchError> {
        if let Some(certificate) = self.lookup(url.as_str()) {
            debug!(cert_url = %url, "Signing certificate served from cache");
            metric_inc!(CERTIFICATE_FETCHES, &["cached"]);
            return Ok(certificate);
        }

        let certificate = self.inner.fetch(url).await?;
        self.store(url.as_str().to_string(), certificate.clone());
        Ok(certificate)
    }
}

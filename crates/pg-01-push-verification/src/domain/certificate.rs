//! # Certificate Origin Policy
//!
//! Decides, before any network I/O, whether a URL may be contacted for a
//! signing certificate (or, when enabled, a subscription confirmation).
//!
//! A host is trusted when it equals an allow-listed domain or is a subdomain
//! of one (`sns.us-east-1.amazonaws.com` matches `amazonaws.com`,
//! `amazonaws.com.evil.example` and `evilamazonaws.com` do not).

use super::errors::FetchError;
use url::Url;

/// Default publisher domain.
pub const DEFAULT_ALLOWED_DOMAIN: &str = "amazonaws.com";

/// Allow-list of publisher domains plus the transport requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificatePolicy {
    allowed_domains: Vec<String>,
    require_https: bool,
}

impl Default for CertificatePolicy {
    fn default() -> Self {
        Self::new([DEFAULT_ALLOWED_DOMAIN], true)
    }
}

impl CertificatePolicy {
    /// Domains are matched case-insensitively; a leading `.` is ignored.
    pub fn new<I, S>(allowed_domains: I, require_https: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_domains = allowed_domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            allowed_domains,
            require_https,
        }
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    pub fn require_https(&self) -> bool {
        self.require_https
    }

    /// Check `url` against the policy.
    ///
    /// # Errors
    /// * `InsecureScheme` - scheme is not `https` while HTTPS is required
    /// * `UntrustedOrigin` - host is not an allow-listed domain or subdomain
    pub fn check(&self, url: &Url) -> Result<(), FetchError> {
        if self.require_https && url.scheme() != "https" {
            return Err(FetchError::InsecureScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .map(|h| h.trim_end_matches('.').to_ascii_lowercase())
            .ok_or_else(|| FetchError::UntrustedOrigin(url.to_string()))?;

        if self.is_allowed_host(&host) {
            Ok(())
        } else {
            Err(FetchError::UntrustedOrigin(host))
        }
    }

    fn is_allowed_host(&self, host: &str) -> bool {
        self.allowed_domains.iter().any(|domain| {
            host == domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

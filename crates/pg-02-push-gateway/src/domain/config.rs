//! Gateway configuration with validation.
//!
//! Every value has a default and can be overridden from the environment with
//! [`GatewayConfig::from_env`]. Durations accept `"5s"`, `"500ms"`, `"2m"` or
//! plain seconds.

use pg_01_push_verification::{CertificatePolicy, DEFAULT_ALLOWED_DOMAIN};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Topic used when `SNS_TOPIC_ARN` is not set.
pub const DEFAULT_TOPIC: &str = "arn:aws:sns:region:123456789012:test-topic";

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Message acceptance rules
    pub receiver: ReceiverConfig,
    /// Signing certificate retrieval
    pub certificates: CertificateConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Request limits
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Load defaults overridden by process environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `SNS_TOPIC_ARN` | `receiver.expected_topic` |
    /// | `PG_RESTRICT_SUBSCRIBE_URL` | `receiver.restrict_subscribe_url` |
    /// | `PG_HOST` / `PG_PORT` | `http.host` / `http.port` |
    /// | `PG_CERT_ALLOWED_DOMAINS` | `certificates.allowed_domains` (comma separated) |
    /// | `PG_CERT_REQUIRE_HTTPS` | `certificates.require_https` |
    /// | `PG_CERT_CACHE_TTL` | `certificates.cache_ttl` |
    /// | `PG_CERT_FETCH_TIMEOUT` | `timeouts.certificate_fetch` |
    /// | `PG_CONFIRM_TIMEOUT` | `timeouts.subscription_confirm` |
    /// | `PG_REQUEST_TIMEOUT` | `timeouts.request` |
    /// | `PG_MAX_BODY_BYTES` | `limits.max_body_bytes` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(topic) = var("SNS_TOPIC_ARN") {
            config.receiver.expected_topic = topic;
        }
        if let Some(v) = var("PG_RESTRICT_SUBSCRIBE_URL") {
            config.receiver.restrict_subscribe_url = parse_bool("PG_RESTRICT_SUBSCRIBE_URL", &v)?;
        }
        if let Some(v) = var("PG_HOST") {
            config.http.host = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("PG_HOST: {e}")))?;
        }
        if let Some(v) = var("PG_PORT") {
            config.http.port = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("PG_PORT: {e}")))?;
        }
        if let Some(v) = var("PG_CERT_ALLOWED_DOMAINS") {
            config.certificates.allowed_domains = v
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = var("PG_CERT_REQUIRE_HTTPS") {
            config.certificates.require_https = parse_bool("PG_CERT_REQUIRE_HTTPS", &v)?;
        }
        if let Some(v) = var("PG_CERT_CACHE_TTL") {
            config.certificates.cache_ttl = Some(parse_duration_var("PG_CERT_CACHE_TTL", &v)?);
        }
        if let Some(v) = var("PG_CERT_FETCH_TIMEOUT") {
            config.timeouts.certificate_fetch = parse_duration_var("PG_CERT_FETCH_TIMEOUT", &v)?;
        }
        if let Some(v) = var("PG_CONFIRM_TIMEOUT") {
            config.timeouts.subscription_confirm = parse_duration_var("PG_CONFIRM_TIMEOUT", &v)?;
        }
        if let Some(v) = var("PG_REQUEST_TIMEOUT") {
            config.timeouts.request = parse_duration_var("PG_REQUEST_TIMEOUT", &v)?;
        }
        if let Some(v) = var("PG_MAX_BODY_BYTES") {
            config.limits.max_body_bytes = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("PG_MAX_BODY_BYTES: {e}")))?;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.receiver.expected_topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }

        if self.certificates.certificate_policy().allowed_domains().is_empty() {
            return Err(ConfigError::Invalid(
                "certificates.allowed_domains cannot be empty".into(),
            ));
        }

        for (name, timeout) in [
            ("certificate_fetch", self.timeouts.certificate_fetch),
            ("subscription_confirm", self.timeouts.subscription_confirm),
            ("request", self.timeouts.request),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!(
                    "{name} timeout cannot be 0"
                )));
            }
        }

        if self.certificates.cache_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(ConfigError::InvalidTimeout(
                "certificate cache_ttl cannot be 0".into(),
            ));
        }

        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8000,
        }
    }
}

/// Message acceptance rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// The only `TopicArn` accepted
    pub expected_topic: String,
    /// Apply the certificate origin policy to `SubscribeURL` too
    pub restrict_subscribe_url: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            expected_topic: DEFAULT_TOPIC.to_string(),
            restrict_subscribe_url: false,
        }
    }
}

/// Signing certificate retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    /// Publisher domains certificates may be served from
    pub allowed_domains: Vec<String>,
    /// Refuse non-HTTPS certificate URLs
    pub require_https: bool,
    /// Cache fetched certificates for this long (disabled when unset)
    #[serde(with = "humantime_serde::option")]
    pub cache_ttl: Option<Duration>,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            allowed_domains: vec![DEFAULT_ALLOWED_DOMAIN.to_string()],
            require_https: true,
            cache_ttl: None,
        }
    }
}

impl CertificateConfig {
    pub fn certificate_policy(&self) -> CertificatePolicy {
        CertificatePolicy::new(&self.allowed_domains, self.require_https)
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Signing certificate download
    #[serde(with = "humantime_serde")]
    pub certificate_fetch: Duration,
    /// Subscription confirmation GET
    #[serde(with = "humantime_serde")]
    pub subscription_confirm: Duration,
    /// Whole inbound request
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            certificate_fetch: Duration::from_secs(5),
            subscription_confirm: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 256 * 1024,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// No expected topic configured
    #[error("expected topic cannot be empty")]
    EmptyTopic,
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "{key}: expected a boolean, got {other:?}"
        ))),
    }
}

fn parse_duration_var(key: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime_serde::parse_duration(value)
        .map_err(|e| ConfigError::Invalid(format!("{key}: {e}")))
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn format_duration(duration: Duration) -> String {
        if duration.subsec_millis() == 0 {
            format!("{}s", duration.as_secs())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.receiver.expected_topic, DEFAULT_TOPIC);
        assert_eq!(config.certificates.allowed_domains, vec!["amazonaws.com"]);
        assert!(config.certificates.require_https);
        assert_eq!(config.certificates.cache_ttl, None);
        assert_eq!(config.timeouts.certificate_fetch, Duration::from_secs(5));
        assert!(!config.receiver.restrict_subscribe_url);
    }

    #[test]
    fn test_env_overrides() {
        let config = from_vars(&[
            ("SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:111122223333:orders"),
            ("PG_PORT", "9000"),
            ("PG_HOST", "127.0.0.1"),
            ("PG_CERT_ALLOWED_DOMAINS", "amazonaws.com, amazonaws.com.cn"),
            ("PG_CERT_REQUIRE_HTTPS", "false"),
            ("PG_CERT_CACHE_TTL", "10m"),
            ("PG_CERT_FETCH_TIMEOUT", "1500ms"),
            ("PG_RESTRICT_SUBSCRIBE_URL", "yes"),
            ("PG_MAX_BODY_BYTES", "1024"),
        ])
        .unwrap();

        assert_eq!(
            config.receiver.expected_topic,
            "arn:aws:sns:eu-west-1:111122223333:orders"
        );
        assert_eq!(config.http_addr(), "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.certificates.allowed_domains,
            vec!["amazonaws.com", "amazonaws.com.cn"]
        );
        assert!(!config.certificates.require_https);
        assert_eq!(config.certificates.cache_ttl, Some(Duration::from_secs(600)));
        assert_eq!(config.timeouts.certificate_fetch, Duration::from_millis(1500));
        assert!(config.receiver.restrict_subscribe_url);
        assert_eq!(config.limits.max_body_bytes, 1024);
    }

    #[test]
    fn test_blank_vars_ignored() {
        let config = from_vars(&[("SNS_TOPIC_ARN", "  ")]).unwrap();
        assert_eq!(config.receiver.expected_topic, DEFAULT_TOPIC);
    }

    #[test]
    fn test_bad_env_values_rejected() {
        assert!(matches!(
            from_vars(&[("PG_PORT", "eighty")]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            from_vars(&[("PG_REQUEST_TIMEOUT", "soon")]),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            from_vars(&[("PG_CERT_REQUIRE_HTTPS", "maybe")]),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = GatewayConfig::default();
        config.receiver.expected_topic = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTopic)));

        let mut config = GatewayConfig::default();
        config.certificates.allowed_domains = vec![" ".to_string()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GatewayConfig::default();
        config.timeouts.request = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));

        let mut config = GatewayConfig::default();
        config.limits.max_body_bytes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{"timeouts": {"request": "500ms"}, "certificates": {"cache_ttl": "1m"}}"#,
        )
        .unwrap();
        assert_eq!(config.timeouts.request, Duration::from_millis(500));
        assert_eq!(config.timeouts.certificate_fetch, Duration::from_secs(5));
        assert_eq!(config.certificates.cache_ttl, Some(Duration::from_secs(60)));
        assert_eq!(config.http.port, 8000);
    }
}

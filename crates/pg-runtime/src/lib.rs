//! # Pushgate Runtime
//!
//! Wiring for the `pushgate` binary.
//!
//! ## Startup Sequence
//!
//! 1. Initialise telemetry from the environment
//! 2. Load and validate [`GatewayConfig`]
//! 3. Construct the adapters once (certificate fetcher, optional cache, confirmer)
//! 4. Wrap them in the verification service and hand it to the gateway
//! 5. Serve until Ctrl+C, then drain in-flight requests

use pg_01_push_verification::{
    CachingCertificateSource, CertificateSource, HttpCertificateFetcher,
    HttpSubscriptionConfirmer, PushReceiverApi, PushVerificationService,
};
use pg_02_push_gateway::GatewayConfig;
use std::sync::Arc;
use tracing::info;

/// Adapter construction errors
pub type WiringError = Box<dyn std::error::Error + Send + Sync>;

/// Build the receiver pipeline described by `config`.
pub fn build_receiver(config: &GatewayConfig) -> Result<Arc<dyn PushReceiverApi>, WiringError> {
    let policy = config.certificates.certificate_policy();
    let fetcher = HttpCertificateFetcher::new(policy.clone(), config.timeouts.certificate_fetch)?;

    let certificates: Arc<dyn CertificateSource> = match config.certificates.cache_ttl {
        Some(ttl) => {
            info!(ttl_ms = ttl.as_millis() as u64, "Certificate cache enabled");
            Arc::new(CachingCertificateSource::new(fetcher, ttl))
        }
        None => Arc::new(fetcher),
    };

    let confirmer = HttpSubscriptionConfirmer::new(config.timeouts.subscription_confirm)?;

    let mut service =
        PushVerificationService::new(config.receiver.expected_topic.clone(), certificates, confirmer);
    if config.receiver.restrict_subscribe_url {
        info!("SubscribeURL restricted to the certificate allow-list");
        service = service.with_subscribe_url_policy(policy);
    }

    info!(
        topic = %config.receiver.expected_topic,
        allowed_domains = ?config.certificates.allowed_domains,
        "Receiver pipeline ready"
    );
    Ok(Arc::new(service))
}

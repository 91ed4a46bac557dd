//! # Push Verification Service
//!
//! Application service implementing [`PushReceiverApi`].
//!
//! ## Pipeline
//!
//! ```text
//! raw bytes -> parse -> topic check -> certificate fetch -> signature check -> dispatch
//! ```
//!
//! Each step gates the next. The topic check runs before any network call so
//! messages for foreign topics cost nothing beyond parsing.
//!
//! | Condition | Result |
//! |-----------|--------|
//! | topic mismatch | `Rejection::InvalidTopic` |
//! | certificate or signature failure | `Rejection::InvalidSignature` |
//! | `Notification` | logged, `Acknowledgement::MessageReceived` |
//! | `SubscriptionConfirmation` | confirmer called; `SubscriptionConfirmed` or `Rejection::InvalidSubscribeUrl` |
//! | `UnsubscribeConfirmation` | `Acknowledgement::UnsubscribeConfirmed` |

use crate::domain::certificate::CertificatePolicy;
use crate::domain::entities::{
    Acknowledgement, PushMessage, SubscriptionConfirmation, VerificationResult,
};
use crate::domain::errors::{ReceiveError, Rejection};
use crate::domain::parser;
use crate::domain::signature::SignatureVerifier;
use crate::domain::topic::TopicAuthorizer;
use crate::ports::inbound::PushReceiverApi;
use crate::ports::outbound::{CertificateSource, SubscriptionConfirmer};
use async_trait::async_trait;
use pg_telemetry::{metric_inc, MESSAGES_RECEIVED, MESSAGES_REJECTED};
use tracing::{info, warn};

/// Push verification and dispatch service.
///
/// Collaborators are built once at start and shared by every request.
pub struct PushVerificationService<C, S> {
    authorizer: TopicAuthorizer,
    verifier: SignatureVerifier,
    certificates: C,
    confirmer: S,
    subscribe_url_policy: Option<CertificatePolicy>,
}

impl<C: CertificateSource, S: SubscriptionConfirmer> PushVerificationService<C, S> {
    /// Create a service accepting messages for `expected_topic`.
    pub fn new(expected_topic: impl Into<String>, certificates: C, confirmer: S) -> Self {
        Self {
            authorizer: TopicAuthorizer::new(expected_topic),
            verifier: SignatureVerifier::new(),
            certificates,
            confirmer,
            subscribe_url_policy: None,
        }
    }

    /// Also require `SubscribeURL` to satisfy `policy` before it is visited.
    pub fn with_subscribe_url_policy(mut self, policy: CertificatePolicy) -> Self {
        self.subscribe_url_policy = Some(policy);
        self
    }

    pub fn expected_topic(&self) -> &str {
        self.authorizer.expected_topic()
    }

    /// Run topic, signature and dispatch steps on a parsed message.
    pub async fn process(&self, message: &PushMessage) -> Result<Acknowledgement, Rejection> {
        let base = message.base();

        if !self.authorizer.authorize(message) {
            warn!(
                message_id = %base.message_id,
                topic = %base.topic_identifier,
                "Rejecting message for unexpected topic"
            );
            return Err(Rejection::InvalidTopic);
        }

        let verification = self.authenticate(message).await;
        if !verification.authentic {
            warn!(
                message_id = %base.message_id,
                cert_url = %base.signing_cert_url,
                reason = ?verification.reason,
                "Rejecting message with invalid signature"
            );
            return Err(Rejection::InvalidSignature);
        }

        self.dispatch(message).await
    }

    async fn authenticate(&self, message: &PushMessage) -> VerificationResult {
        match self.certificates.fetch(&message.base().signing_cert_url).await {
            Ok(certificate) => self.verifier.verify(message, &certificate),
            Err(e) => VerificationResult::rejected(e.into()),
        }
    }

    async fn dispatch(&self, message: &PushMessage) -> Result<Acknowledgement, Rejection> {
        match message {
            PushMessage::Notification(notification) => {
                info!(
                    message_id = %notification.base.message_id,
                    topic = %notification.base.topic_identifier,
                    subject = notification.subject.as_deref().unwrap_or_default(),
                    message = %notification.base.message_body,
                    "Received notification"
                );
                Ok(Acknowledgement::MessageReceived)
            }
            PushMessage::SubscriptionConfirmation(confirmation) => {
                self.confirm_subscription(confirmation).await
            }
            PushMessage::UnsubscribeConfirmation(confirmation) => {
                info!(
                    message_id = %confirmation.base.message_id,
                    topic = %confirmation.base.topic_identifier,
                    "Unsubscribe confirmed"
                );
                Ok(Acknowledgement::UnsubscribeConfirmed)
            }
        }
    }

    async fn confirm_subscription(
        &self,
        confirmation: &SubscriptionConfirmation,
    ) -> Result<Acknowledgement, Rejection> {
        if let Some(policy) = &self.subscribe_url_policy {
            if let Err(e) = policy.check(confirmation.subscribe_url.url()) {
                warn!(
                    message_id = %confirmation.base.message_id,
                    subscribe_url = %confirmation.subscribe_url,
                    error = %e,
                    "Refusing SubscribeURL"
                );
                return Err(Rejection::InvalidSubscribeUrl);
            }
        }

        if self.confirmer.confirm(&confirmation.subscribe_url).await {
            Ok(Acknowledgement::SubscriptionConfirmed)
        } else {
            Err(Rejection::InvalidSubscribeUrl)
        }
    }
}

#[async_trait]
impl<C: CertificateSource, S: SubscriptionConfirmer> PushReceiverApi
    for PushVerificationService<C, S>
{
    async fn receive(&self, body: &[u8]) -> Result<Acknowledgement, ReceiveError> {
        let message = match parser::parse(body) {
            Ok(message) => message,
            Err(e) => {
                warn!(violations = e.violations.len(), error = %e, "Rejecting unparseable message");
                metric_inc!(MESSAGES_REJECTED, &["invalid_body"]);
                return Err(e.into());
            }
        };

        metric_inc!(MESSAGES_RECEIVED, &[message.message_type().as_str()]);

        self.process(&message).await.map_err(|rejection| {
            metric_inc!(MESSAGES_REJECTED, &[rejection.metric_label()]);
            ReceiveError::Rejected(rejection)
        })
    }
}

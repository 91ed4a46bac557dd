//! Test fixtures: an RSA signing identity, message builders and fake ports.
//!
//! Available to unit tests and, through the `test-utils` feature, to other
//! crates' test suites.

use crate::domain::canonical::canonical_string;
use crate::domain::entities::{
    MessageBase, Notification, PushMessage, SigningCertificate, SubscriptionConfirmation,
    ValidatedUrl,
};
use crate::domain::errors::FetchError;
use crate::domain::parser::field;
use crate::domain::signature::DigestAlgorithm;
use crate::ports::outbound::{CertificateSource, SubscriptionConfirmer};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde_json::{Map, Value};
use sha1::Sha1;
use sha2::Sha256;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Self-signed certificate for [`signing_key`].
pub const SIGNING_CERT_PEM: &str = include_str!("../fixtures/signing_cert.pem");
const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
const FOREIGN_KEY_PEM: &str = include_str!("../fixtures/foreign_key.pem");

pub const TEST_TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:test-topic";
pub const TEST_CERT_URL: &str =
    "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-test.pem";
pub const TEST_SUBSCRIBE_URL: &str =
    "https://sns.us-east-1.amazonaws.com/?Action=ConfirmSubscription&TopicArn=arn:aws:sns:us-east-1:123456789012:test-topic&Token=token-123";

/// Private key matching [`SIGNING_CERT_PEM`].
pub fn signing_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(SIGNING_KEY_PEM).expect("fixture signing key")
}

/// A key the certificate does not vouch for.
pub fn foreign_signing_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(FOREIGN_KEY_PEM).expect("fixture foreign key")
}

pub fn signing_certificate() -> SigningCertificate {
    SigningCertificate::from_pem(SIGNING_CERT_PEM.as_bytes(), TEST_CERT_URL)
        .expect("fixture certificate")
}

fn base(topic: &str, body: &str) -> MessageBase {
    MessageBase {
        message_id: "b7a2c3f0-5a8e-4a59-a8b1-0f7c0c1e9d10".to_string(),
        topic_identifier: topic.to_string(),
        timestamp: "2024-03-15T12:00:00.000Z".to_string(),
        signature_version: "2".to_string(),
        signature: String::new(),
        signing_cert_url: url(TEST_CERT_URL),
        message_body: body.to_string(),
    }
}

fn url(raw: &str) -> ValidatedUrl {
    ValidatedUrl::parse(raw).expect("fixture url")
}

/// Unsigned notification with a subject and `SignatureVersion` `"2"`.
pub fn notification(topic: &str, body: &str) -> PushMessage {
    PushMessage::Notification(Notification {
        base: base(topic, body),
        subject: Some("Test Subject".to_string()),
    })
}

/// Unsigned subscription confirmation pointing at `subscribe_url`.
pub fn subscription_confirmation(topic: &str, subscribe_url: &str) -> PushMessage {
    PushMessage::SubscriptionConfirmation(confirmation(topic, subscribe_url))
}

/// Unsigned unsubscribe confirmation pointing at `subscribe_url`.
pub fn unsubscribe_confirmation(topic: &str, subscribe_url: &str) -> PushMessage {
    PushMessage::UnsubscribeConfirmation(confirmation(topic, subscribe_url))
}

fn confirmation(topic: &str, subscribe_url: &str) -> SubscriptionConfirmation {
    SubscriptionConfirmation {
        base: base(topic, "You have chosen to subscribe to the topic."),
        subscribe_url: url(subscribe_url),
        token: "token-123".to_string(),
    }
}

fn base_mut(message: &mut PushMessage) -> &mut MessageBase {
    match message {
        PushMessage::Notification(n) => &mut n.base,
        PushMessage::SubscriptionConfirmation(s) | PushMessage::UnsubscribeConfirmation(s) => {
            &mut s.base
        }
    }
}

/// Replace the signing certificate URL.
pub fn with_cert_url(mut message: PushMessage, cert_url: &str) -> PushMessage {
    base_mut(&mut message).signing_cert_url = url(cert_url);
    message
}

/// Replace the signature version. Does not re-sign.
pub fn with_signature_version(mut message: PushMessage, version: &str) -> PushMessage {
    base_mut(&mut message).signature_version = version.to_string();
    message
}

/// Sign with the fixture key using the digest its `SignatureVersion` selects.
pub fn sign(message: &PushMessage) -> PushMessage {
    sign_with(message, &signing_key())
}

/// Sign with an arbitrary key.
pub fn sign_with(message: &PushMessage, key: &RsaPrivateKey) -> PushMessage {
    let canonical = canonical_string(message);
    let digest = DigestAlgorithm::for_signature_version(&message.base().signature_version);
    let signature = match digest {
        DigestAlgorithm::Sha256 => SigningKey::<Sha256>::new(key.clone())
            .sign(canonical.as_bytes())
            .to_vec(),
        DigestAlgorithm::Sha1 => SigningKey::<Sha1>::new(key.clone())
            .sign(canonical.as_bytes())
            .to_vec(),
    };

    let mut signed = message.clone();
    base_mut(&mut signed).signature = STANDARD.encode(signature);
    signed
}

/// The publisher's JSON representation of `message`.
pub fn to_json(message: &PushMessage) -> Value {
    let base = message.base();
    let mut object = Map::new();
    let mut put = |name: &str, value: &str| {
        object.insert(name.to_string(), Value::String(value.to_string()));
    };

    put(field::TYPE, message.message_type().as_str());
    put(field::MESSAGE_ID, &base.message_id);
    put(field::TOPIC_ARN, &base.topic_identifier);
    put(field::MESSAGE, &base.message_body);
    put(field::TIMESTAMP, &base.timestamp);
    put(field::SIGNATURE_VERSION, &base.signature_version);
    put(field::SIGNATURE, &base.signature);
    put(field::SIGNING_CERT_URL, base.signing_cert_url.as_str());

    match message {
        PushMessage::Notification(n) => {
            if let Some(subject) = &n.subject {
                put(field::SUBJECT, subject);
            }
        }
        PushMessage::SubscriptionConfirmation(s) | PushMessage::UnsubscribeConfirmation(s) => {
            put(field::SUBSCRIBE_URL, s.subscribe_url.as_str());
            put(field::TOKEN, &s.token);
        }
    }
    Value::Object(object)
}

/// Request body bytes for `message`.
pub fn to_body(message: &PushMessage) -> Vec<u8> {
    to_json(message).to_string().into_bytes()
}

// =============================================================================
// Fake Ports
// =============================================================================

/// Certificate source returning a fixed result and counting calls.
pub struct FakeCertificateSource {
    result: Result<SigningCertificate, FetchError>,
    calls: AtomicUsize,
}

impl FakeCertificateSource {
    /// Always serves the fixture certificate.
    pub fn serving_fixture() -> Self {
        Self::returning(Ok(signing_certificate()))
    }

    pub fn returning(result: Result<SigningCertificate, FetchError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateSource for FakeCertificateSource {
    async fn fetch(&self, _url: &ValidatedUrl) -> Result<SigningCertificate, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Subscription confirmer with a fixed answer that records visited URLs.
pub struct FakeConfirmer {
    accept: bool,
    visited: Mutex<Vec<String>>,
}

impl FakeConfirmer {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            visited: Mutex::new(Vec::new()),
        }
    }

    pub fn refusing() -> Self {
        Self {
            accept: false,
            visited: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.visited.lock().len()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

#[async_trait]
impl SubscriptionConfirmer for FakeConfirmer {
    async fn confirm(&self, url: &ValidatedUrl) -> bool {
        self.visited.lock().push(url.as_str().to_string());
        self.accept
    }
}

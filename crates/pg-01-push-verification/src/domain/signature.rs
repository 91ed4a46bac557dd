//! # Signature Verification (RSA PKCS#1 v1.5)
//!
//! Pure domain logic: checks a message's `Signature` against the canonical
//! string under the signing certificate's public key.
//!
//! ## Digest selection
//!
//! `SignatureVersion` `"2"` selects SHA-256. Any other value, `"1"` included,
//! selects SHA-1. The mapping is fixed protocol behavior.
//!
//! Every failure (bad base64, bad length, padding or digest mismatch) is an
//! outcome, never a panic or a propagated error.

use super::canonical::canonical_string;
use super::entities::{PushMessage, SigningCertificate, VerificationResult};
use super::errors::VerificationError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha1::Sha1;
use sha2::Sha256;
use tracing::debug;

/// Digest used for the PKCS#1 v1.5 signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Map a `SignatureVersion` value to its digest.
    pub fn for_signature_version(version: &str) -> Self {
        match version {
            "2" => DigestAlgorithm::Sha256,
            _ => DigestAlgorithm::Sha1,
        }
    }
}

/// Stateless verifier for push message signatures.
#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify `message` against the key of `certificate`.
    ///
    /// `Signature` must be strict standard base64; surrounding whitespace is
    /// not tolerated.
    pub fn verify(
        &self,
        message: &PushMessage,
        certificate: &SigningCertificate,
    ) -> VerificationResult {
        let base = message.base();

        let signature = match STANDARD.decode(&base.signature) {
            Ok(bytes) => bytes,
            Err(_) => return VerificationResult::rejected(VerificationError::MalformedSignature),
        };

        let digest = DigestAlgorithm::for_signature_version(&base.signature_version);
        debug!(
            message_id = %base.message_id,
            signature_version = %base.signature_version,
            ?digest,
            "Selected signature digest"
        );

        let canonical = canonical_string(message);
        if verify_pkcs1v15(certificate, digest, canonical.as_bytes(), &signature) {
            VerificationResult::authentic()
        } else {
            VerificationResult::rejected(VerificationError::SignatureMismatch)
        }
    }
}

fn verify_pkcs1v15(
    certificate: &SigningCertificate,
    digest: DigestAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> bool {
    let Ok(signature) = Signature::try_from(signature) else {
        return false;
    };

    match digest {
        DigestAlgorithm::Sha256 => VerifyingKey::<Sha256>::new(certificate.public_key.clone())
            .verify(message, &signature)
            .is_ok(),
        DigestAlgorithm::Sha1 => VerifyingKey::<Sha1>::new(certificate.public_key.clone())
            .verify(message, &signature)
            .is_ok(),
    }
}

//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::Acknowledgement;
use crate::domain::errors::ReceiveError;
use async_trait::async_trait;

/// Primary push receiver API.
///
/// Takes the raw request body and runs the full pipeline:
/// parse, topic check, certificate fetch, signature check, dispatch.
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait PushReceiverApi: Send + Sync {
    /// Process one inbound push message.
    ///
    /// # Errors
    /// * `ReceiveError::Invalid` - body failed to parse (every violation listed)
    /// * `ReceiveError::Rejected` - topic, signature or subscription confirmation refused
    async fn receive(&self, body: &[u8]) -> Result<Acknowledgement, ReceiveError>;
}

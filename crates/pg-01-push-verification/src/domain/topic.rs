//! # Topic Authorization
//!
//! The claimed topic is unsigned at this stage. Passing this check only means
//! the message is worth verifying; authenticity comes from the signature.

use super::entities::PushMessage;

/// Exact-match check of a message's `TopicArn` against the configured topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicAuthorizer {
    expected_topic: String,
}

impl TopicAuthorizer {
    pub fn new(expected_topic: impl Into<String>) -> Self {
        Self {
            expected_topic: expected_topic.into(),
        }
    }

    pub fn expected_topic(&self) -> &str {
        &self.expected_topic
    }

    /// Byte-for-byte equality. No normalization, no wildcards.
    pub fn authorize(&self, message: &PushMessage) -> bool {
        message.topic_identifier() == self.expected_topic
    }
}

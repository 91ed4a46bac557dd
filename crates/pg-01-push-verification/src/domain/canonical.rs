//! # Canonical Signable String
//!
//! Rebuilds the exact byte sequence the publisher signed.
//!
//! Each present field contributes `"<Name>\n<value>\n"`, in a fixed order per
//! message type:
//!
//! | Type | Field order |
//! |------|-------------|
//! | `Notification` | Message, MessageId, Subject (if non-empty), Timestamp, TopicArn, Type |
//! | `SubscriptionConfirmation` / `UnsubscribeConfirmation` | Message, MessageId, SubscribeURL, Timestamp, Token, TopicArn, Type |

use super::entities::PushMessage;
use super::parser::field;

/// Build the canonical signable string for `message`.
pub fn canonical_string(message: &PushMessage) -> String {
    let base = message.base();
    let mut out = String::with_capacity(base.message_body.len() + 256);

    push_field(&mut out, field::MESSAGE, &base.message_body);
    push_field(&mut out, field::MESSAGE_ID, &base.message_id);

    match message {
        PushMessage::Notification(notification) => {
            // An empty subject is treated like an absent one
            if let Some(subject) = notification.subject.as_deref().filter(|s| !s.is_empty()) {
                push_field(&mut out, field::SUBJECT, subject);
            }
            push_field(&mut out, field::TIMESTAMP, &base.timestamp);
        }
        PushMessage::SubscriptionConfirmation(confirmation)
        | PushMessage::UnsubscribeConfirmation(confirmation) => {
            push_field(&mut out, field::SUBSCRIBE_URL, confirmation.subscribe_url.as_str());
            push_field(&mut out, field::TIMESTAMP, &base.timestamp);
            push_field(&mut out, field::TOKEN, &confirmation.token);
        }
    }

    push_field(&mut out, field::TOPIC_ARN, &base.topic_identifier);
    push_field(&mut out, field::TYPE, message.message_type().as_str());
    out
}

fn push_field(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push('\n');
    out.push_str(value);
    out.push('\n');
}

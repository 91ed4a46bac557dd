//! # Message Parser
//!
//! Decodes a raw request body into a [`PushMessage`].
//!
//! The publisher uses capitalized keys (`MessageId`, `SigningCertURL`, ...) and a
//! `Type` discriminator. Every field is checked before returning, so a caller
//! receives the complete list of violations rather than the first one.
//! Keys that are not part of the message model are ignored.

use super::entities::{
    MessageBase, MessageType, Notification, PushMessage, SubscriptionConfirmation, UrlViolation,
    ValidatedUrl,
};
use super::errors::{FieldViolation, ParseError, ViolationKind};
use serde_json::{Map, Value};

/// Publisher field names.
pub mod field {
    pub const TYPE: &str = "Type";
    pub const MESSAGE_ID: &str = "MessageId";
    pub const TOPIC_ARN: &str = "TopicArn";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const SIGNATURE_VERSION: &str = "SignatureVersion";
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNING_CERT_URL: &str = "SigningCertURL";
    pub const MESSAGE: &str = "Message";
    pub const SUBJECT: &str = "Subject";
    pub const SUBSCRIBE_URL: &str = "SubscribeURL";
    pub const TOKEN: &str = "Token";
}

/// Parse a raw body into a push message.
///
/// # Errors
/// * `ParseError` listing every violation found (at least one)
pub fn parse(bytes: &[u8]) -> Result<PushMessage, ParseError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| ParseError {
        violations: vec![FieldViolation::new(
            ViolationKind::JsonInvalid,
            None,
            format!("JSON decode error: {e}"),
        )],
    })?;

    let Value::Object(object) = value else {
        return Err(ParseError {
            violations: vec![FieldViolation::new(
                ViolationKind::ModelType,
                None,
                "Input should be a valid dictionary or object",
            )],
        });
    };

    let mut reader = FieldReader::new(&object);
    let message_type = reader.discriminator();
    let base = read_base(&mut reader);

    let message = match message_type {
        Some(MessageType::Notification) => {
            let subject = reader.optional_str(field::SUBJECT);
            base.map(|base| PushMessage::Notification(Notification { base, subject }))
        }
        Some(MessageType::SubscriptionConfirmation) => read_confirmation(&mut reader, base)
            .map(PushMessage::SubscriptionConfirmation),
        Some(MessageType::UnsubscribeConfirmation) => read_confirmation(&mut reader, base)
            .map(PushMessage::UnsubscribeConfirmation),
        None => None,
    };

    match message {
        Some(message) if reader.violations.is_empty() => Ok(message),
        _ => Err(ParseError {
            violations: reader.violations,
        }),
    }
}

fn read_base(reader: &mut FieldReader<'_>) -> Option<MessageBase> {
    let message_id = reader.non_empty_str(field::MESSAGE_ID);
    let topic_identifier = reader.required_str(field::TOPIC_ARN);
    let timestamp = reader.required_str(field::TIMESTAMP);
    let signature_version = reader.required_str(field::SIGNATURE_VERSION);
    let signature = reader.required_str(field::SIGNATURE);
    let signing_cert_url = reader.required_url(field::SIGNING_CERT_URL);
    let message_body = reader.required_str(field::MESSAGE);

    Some(MessageBase {
        message_id: message_id?,
        topic_identifier: topic_identifier?,
        timestamp: timestamp?,
        signature_version: signature_version?,
        signature: signature?,
        signing_cert_url: signing_cert_url?,
        message_body: message_body?,
    })
}

fn read_confirmation(
    reader: &mut FieldReader<'_>,
    base: Option<MessageBase>,
) -> Option<SubscriptionConfirmation> {
    let subscribe_url = reader.required_url(field::SUBSCRIBE_URL);
    let token = reader.required_str(field::TOKEN);

    Some(SubscriptionConfirmation {
        base: base?,
        subscribe_url: subscribe_url?,
        token: token?,
    })
}

/// Reads typed fields from a JSON object, accumulating violations.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    violations: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            violations: Vec::new(),
        }
    }

    fn violation(&mut self, kind: ViolationKind, name: &str, message: impl Into<String>) {
        self.violations
            .push(FieldViolation::new(kind, Some(name), message));
    }

    fn discriminator(&mut self) -> Option<MessageType> {
        match self.object.get(field::TYPE) {
            None | Some(Value::Null) => {
                self.violation(
                    ViolationKind::UnionTagNotFound,
                    field::TYPE,
                    "Unable to extract tag using discriminator 'Type'",
                );
                None
            }
            Some(value) => {
                let found = value.as_str().and_then(MessageType::from_wire);
                if found.is_none() {
                    let tag = value
                        .as_str()
                        .map_or_else(|| value.to_string(), str::to_string);
                    self.violation(
                        ViolationKind::UnionTagInvalid,
                        field::TYPE,
                        format!(
                            "Input tag '{tag}' found using 'Type' does not match any of the \
                             expected tags: 'Notification', 'SubscriptionConfirmation', \
                             'UnsubscribeConfirmation'"
                        ),
                    );
                }
                found
            }
        }
    }

    fn required_str(&mut self, name: &str) -> Option<String> {
        match self.object.get(name) {
            None => {
                self.violation(ViolationKind::Missing, name, "Field required");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.violation(
                    ViolationKind::StringType,
                    name,
                    "Input should be a valid string",
                );
                None
            }
        }
    }

    fn non_empty_str(&mut self, name: &str) -> Option<String> {
        let value = self.required_str(name)?;
        if value.is_empty() {
            self.violation(
                ViolationKind::StringTooShort,
                name,
                "String should have at least 1 character",
            );
            return None;
        }
        Some(value)
    }

    /// `null` and absent both read as `None`.
    fn optional_str(&mut self, name: &str) -> Option<String> {
        match self.object.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.violation(
                    ViolationKind::StringType,
                    name,
                    "Input should be a valid string",
                );
                None
            }
        }
    }

    fn required_url(&mut self, name: &str) -> Option<ValidatedUrl> {
        let raw = self.required_str(name)?;
        match ValidatedUrl::parse(&raw) {
            Ok(url) => Some(url),
            Err(UrlViolation::Parsing(reason)) => {
                self.violation(
                    ViolationKind::UrlParsing,
                    name,
                    format!("Input should be a valid URL, {reason}"),
                );
                None
            }
            Err(UrlViolation::Scheme(_)) => {
                self.violation(
                    ViolationKind::UrlScheme,
                    name,
                    "URL scheme should be 'http' or 'https'",
                );
                None
            }
        }
    }
}

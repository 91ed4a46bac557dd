//! Middleware stack for the Push Gateway.
//!
//! Layer order: Request → Tracing → Timeout → Body limit → Handler

pub mod timeout;
pub mod tracing;

pub use self::timeout::TimeoutLayer;
pub use self::tracing::{TracingLayer, REQUEST_ID_HEADER, SNS_MESSAGE_ID_HEADER};

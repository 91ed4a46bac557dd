//! Domain types for the Push Gateway.
//!
//! Configuration and the HTTP error model.

pub mod config;
pub mod error;

// Re-exports for convenience
pub use config::{
    CertificateConfig, ConfigError, GatewayConfig, HttpConfig, LimitsConfig, ReceiverConfig,
    TimeoutConfig, DEFAULT_TOPIC,
};
pub use error::{ApiError, GatewayError, SuccessResponse, ValidationDetail};

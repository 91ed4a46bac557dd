//! # Adapters Layer
//!
//! Network implementations of the outbound ports.

pub mod cache;
pub mod http;

pub use cache::CachingCertificateSource;
pub use http::{HttpCertificateFetcher, HttpSubscriptionConfirmer};

//! # Integration Flows
//!
//! Every flow runs the full stack: gateway router, verification service,
//! reqwest certificate fetcher and subscription confirmer, against a local
//! axum server standing in for the publisher.

pub mod harness;

mod flows;

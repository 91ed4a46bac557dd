//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API the HTTP gateway calls
//! - **Outbound (Driven)**: Network collaborators this subsystem needs

pub mod inbound;
pub mod outbound;

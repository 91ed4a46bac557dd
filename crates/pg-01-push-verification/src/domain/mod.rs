//! # Domain Layer
//!
//! Message model, parsing, canonicalization and signature checks.
//! No network I/O happens here.

pub mod canonical;
pub mod certificate;
pub mod entities;
pub mod errors;
pub mod parser;
pub mod signature;
pub mod topic;

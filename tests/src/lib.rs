//! # Pushgate Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # End-to-end flows over real HTTP adapters
//! │   ├── harness.rs     # Local publisher stub + running receiver
//! │   └── flows.rs
//! └── benches/           # criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pg-tests
//! cargo bench -p pg-tests
//! ```

pub mod integration;

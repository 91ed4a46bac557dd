//! # Push Gateway (PG-02)
//!
//! HTTP surface of the Pushgate receiver.
//!
//! ## Architecture
//!
//! ```text
//!  publisher ──POST /──▶ ┌──────────────────────────────────────┐
//!                        │  Middleware: Tracing → Timeout        │
//!                        │  Body limit                           │
//!                        ├──────────────────────────────────────┤
//!                        │  receive_push ──▶ PushReceiverApi     │──▶ pg-01
//!                        │  ApiError / SuccessResponse mapping   │
//!                        └──────────────────────────────────────┘
//! ```
//!
//! The gateway never inspects message content itself; everything past the
//! raw body is delegated to the [`PushReceiverApi`] it was constructed with.
//!
//! ## Responses
//!
//! | Outcome | Status |
//! |---------|--------|
//! | accepted | 200 `{"status": "success", "message": ..}` |
//! | rejected | 400 `{"detail": "<reason>"}` |
//! | unparseable body | 422 `{"detail": [..]}` |
//! | body too large | 413 |
//! | deadline exceeded | 504 |

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::{
    ApiError, CertificateConfig, ConfigError, GatewayConfig, GatewayError, HttpConfig,
    LimitsConfig, ReceiverConfig, SuccessResponse, TimeoutConfig, ValidationDetail,
    DEFAULT_TOPIC,
};
pub use pg_01_push_verification::PushReceiverApi;
pub use router::{build_router, AppState, RouterSettings};
pub use service::PushGatewayService;

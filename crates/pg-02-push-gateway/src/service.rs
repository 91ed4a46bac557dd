//! Push Gateway service.
//!
//! Owns the listener lifecycle: bind, serve, graceful shutdown.

use crate::domain::{GatewayConfig, GatewayError};
use crate::router::{build_router, RouterSettings};
use axum::Router;
use pg_01_push_verification::PushReceiverApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Push Gateway service state
pub struct PushGatewayService {
    config: GatewayConfig,
    receiver: Arc<dyn PushReceiverApi>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<JoinHandle<()>>,
}

impl PushGatewayService {
    /// Create a new gateway in front of `receiver`
    pub fn new(
        config: GatewayConfig,
        receiver: Arc<dyn PushReceiverApi>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            config,
            receiver,
            shutdown_tx: None,
            server_handle: None,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        build_router(
            Arc::clone(&self.receiver),
            RouterSettings {
                request_timeout: self.config.timeouts.request,
                max_body_bytes: self.config.limits.max_body_bytes,
            },
        )
    }

    /// Bind the listener and start serving in the background.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 was requested.
    pub async fn start(&mut self) -> Result<SocketAddr, GatewayError> {
        if self.server_handle.is_some() {
            return Err(GatewayError::Internal("gateway already started".into()));
        }

        info!("Starting Push Gateway...");

        let listener = tokio::net::TcpListener::bind(self.config.http_addr())
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let router = self.router();
        self.server_handle = Some(tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
            }
        }));

        info!(
            addr = %local_addr,
            topic = %self.config.receiver.expected_topic,
            "Push Gateway listening"
        );
        Ok(local_addr)
    }

    /// Trigger graceful shutdown and wait for in-flight requests to finish
    pub async fn shutdown(&mut self) -> Result<(), GatewayError> {
        let handle = self.server_handle.take().ok_or(GatewayError::NotStarted)?;
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        handle
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("Push Gateway stopped");
        Ok(())
    }
}

//! Test harness: a publisher stub and a running receiver.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use pg_01_push_verification::test_helpers::{SIGNING_CERT_PEM, TEST_TOPIC};
use pg_02_push_gateway::{GatewayConfig, PushGatewayService};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// PUBLISHER STUB
// =============================================================================

#[derive(Clone, Default)]
struct Hits {
    certificate: Arc<AtomicUsize>,
    confirm: Arc<AtomicUsize>,
}

/// Local server serving the signing certificate and the confirmation endpoints.
pub struct PublisherStub {
    addr: SocketAddr,
    hits: Hits,
}

impl PublisherStub {
    pub async fn start() -> Self {
        let hits = Hits::default();
        let router = Router::new()
            .route("/cert.pem", get(serve_certificate))
            .route("/confirm", get(confirm))
            .route("/refuse", get(refuse))
            .route("/moved", get(|| async { Redirect::temporary("/confirm") }))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, hits }
    }

    pub fn cert_url(&self) -> String {
        format!("http://{}/cert.pem", self.addr)
    }

    /// Confirmation URL answering 200.
    pub fn confirm_url(&self) -> String {
        format!("http://{}/confirm?Token=abc", self.addr)
    }

    /// Confirmation URL answering 500.
    pub fn refuse_url(&self) -> String {
        format!("http://{}/refuse", self.addr)
    }

    /// Confirmation URL redirecting to the 200 endpoint.
    pub fn redirect_url(&self) -> String {
        format!("http://{}/moved", self.addr)
    }

    pub fn certificate_hits(&self) -> usize {
        self.hits.certificate.load(Ordering::SeqCst)
    }

    pub fn confirm_hits(&self) -> usize {
        self.hits.confirm.load(Ordering::SeqCst)
    }
}

async fn serve_certificate(State(hits): State<Hits>) -> &'static str {
    hits.certificate.fetch_add(1, Ordering::SeqCst);
    SIGNING_CERT_PEM
}

async fn confirm(State(hits): State<Hits>) -> StatusCode {
    hits.confirm.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn refuse(State(hits): State<Hits>) -> StatusCode {
    hits.confirm.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

// =============================================================================
// RECEIVER
// =============================================================================

/// Receiver configuration pointing the certificate policy at the local stub.
pub fn local_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.http.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
    config.http.port = 0;
    config.receiver.expected_topic = TEST_TOPIC.to_string();
    config.certificates.allowed_domains = vec!["127.0.0.1".to_string()];
    config.certificates.require_https = false;
    config.timeouts.certificate_fetch = Duration::from_secs(2);
    config.timeouts.subscription_confirm = Duration::from_secs(2);
    config
}

/// A receiver wired exactly as the binary wires it, listening on a free port.
pub struct RunningReceiver {
    gateway: PushGatewayService,
    addr: SocketAddr,
    client: reqwest::Client,
}

impl RunningReceiver {
    pub async fn start(config: GatewayConfig) -> Self {
        let receiver = pg_runtime::build_receiver(&config).unwrap();
        let mut gateway = PushGatewayService::new(config, receiver).unwrap();
        let addr = gateway.start().await.unwrap();
        Self {
            gateway,
            addr,
            client: reqwest::Client::new(),
        }
    }

    /// POST a body the way the publisher does and decode the JSON answer.
    pub async fn post(&self, body: Vec<u8>) -> (u16, Value) {
        let response = self
            .client
            .post(format!("http://{}/", self.addr))
            .header("content-type", "text/plain; charset=UTF-8")
            .body(body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = response.bytes().await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn stop(mut self) {
        drop(self.client);
        self.gateway.shutdown().await.unwrap();
    }
}

//! Tracing middleware.
//!
//! Runs every request inside a `push_request` span carrying a fresh UUID v7
//! `request_id`, echoed back in the `x-request-id` response header. The
//! publisher's `x-amz-sns-message-id` header is recorded when present.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::Response,
};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Publisher header carrying the message id.
pub const SNS_MESSAGE_ID_HEADER: &str = "x-amz-sns-message-id";

/// Tracing layer that creates spans for each request
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let request_id = Uuid::now_v7();

        let span = info_span!(
            "push_request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            request_id = %request_id,
            sns.message_id = tracing::field::Empty,
            otel.kind = "server",
            otel.status_code = tracing::field::Empty,
        );

        if let Some(message_id) = sns_message_id(&req) {
            span.record("sns.message_id", message_id);
        }

        Box::pin(
            async move {
                let mut result = inner.call(req).await;

                // Record status in span
                match &mut result {
                    Ok(response) => {
                        let status = response.status();
                        Span::current().record(
                            "otel.status_code",
                            if status.is_success() { "OK" } else { "ERROR" },
                        );
                        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                            response.headers_mut().insert(REQUEST_ID_HEADER, value);
                        }
                    }
                    Err(_) => {
                        Span::current().record("otel.status_code", "ERROR");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

fn sns_message_id<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(SNS_MESSAGE_ID_HEADER)?
        .to_str()
        .ok()
        .filter(|v| !v.is_empty())
}

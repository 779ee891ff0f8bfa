//! Reqwest-based HTTP transport for webhook delivery.

use std::sync::Arc;

use campus_core::Error;
use jiff::Timestamp;
use reqwest::Client;

use super::{ReqwestConfig, TRACING_TARGET};
use crate::{DeliveryRequest, DeliveryResponse, ServiceHealth, WebhookTransport};

/// Header carrying the webhook's shared secret, verbatim.
pub const HEADER_SECRET: &str = "X-Webhook-Secret";

/// Header carrying the event name.
pub const HEADER_EVENT: &str = "X-Webhook-Event";

/// Header carrying the 1-based attempt ordinal.
pub const HEADER_ATTEMPT: &str = "X-Webhook-Attempt";

/// Inner transport that holds the HTTP client and configuration.
struct ReqwestTransportInner {
    http: Client,
    config: ReqwestConfig,
}

/// Reqwest-based HTTP transport delivering webhook payloads to external
/// endpoints.
///
/// Implements [`WebhookTransport`]. Authentication is a shared-secret
/// scheme: the webhook's secret travels verbatim in [`HEADER_SECRET`] and
/// the receiver compares it against the value it was shown at registration.
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: Arc<ReqwestTransportInner>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Creates a new reqwest transport with the given configuration.
    pub fn new(config: ReqwestConfig) -> Self {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to create HTTP client");

        let inner = ReqwestTransportInner { http, config };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Gets the transport configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    fn http(&self) -> &Client {
        &self.inner.http
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(ReqwestConfig::default())
    }
}

#[async_trait::async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn deliver(&self, request: &DeliveryRequest) -> campus_core::Result<DeliveryResponse> {
        let started_at = Timestamp::now();

        let payload = request.to_payload();
        let payload_bytes = serde_json::to_vec(&payload)?;

        let mut http_request = self
            .http()
            .post(request.url.as_str())
            .header("Content-Type", "application/json")
            .header(HEADER_SECRET, &request.secret)
            .header(HEADER_EVENT, &request.event)
            .header(HEADER_ATTEMPT, request.attempt.to_string())
            .timeout(request.timeout);

        // Static webhook headers are appended after the protocol headers.
        for (name, value) in &request.headers {
            http_request = http_request.header(name, value);
        }

        let http_response = http_request
            .body(payload_bytes)
            .send()
            .await
            .map_err(classify)?;

        let status_code = http_response.status().as_u16();
        let body = http_response.text().await.map_err(classify)?;
        let response = DeliveryResponse::new(request.request_id, status_code, body, started_at);

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            status_code,
            success = response.is_success(),
            "Webhook request completed"
        );

        Ok(response)
    }

    async fn health_check(&self) -> campus_core::Result<ServiceHealth> {
        // The transport is stateless and healthy if it was constructed.
        Ok(ServiceHealth::healthy())
    }
}

/// Maps a transport failure onto the shared error type, keeping timeouts
/// distinguishable from endpoints that cannot be reached at all.
fn classify(error: reqwest::Error) -> Error {
    let base = if error.is_timeout() {
        Error::timeout()
    } else if error.is_connect() {
        Error::network_error().with_context("connection to endpoint failed")
    } else {
        Error::network_error()
    };
    base.with_message(error.to_string()).with_source(error)
}

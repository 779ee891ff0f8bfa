//! Shared test fixtures: a scriptable mock transport and webhook builders.

// Not every test binary exercises every fixture.
#![allow(dead_code)]

use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use campus_webhook::{
    DeliveryRequest, DeliveryResponse, MemoryStore, NewWebhook, NewWebhookDelivery, Pagination,
    ServiceHealth, UpdateWebhook, Webhook, WebhookDelivery, WebhookStore, WebhookTransport,
};
use jiff::Timestamp;
use url::Url;
use uuid::Uuid;

/// Scripted outcome for one mock delivery attempt.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Respond with the given HTTP status and an empty body.
    Status(u16),
    /// Fail at the transport level with the given error message.
    ConnectionError(String),
}

/// Snapshot of one request the mock transport received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: Url,
    pub event: String,
    pub data: serde_json::Value,
    pub secret: String,
    pub attempt: u32,
}

/// Mock [`WebhookTransport`] that replays scripted outcomes and records
/// every request it receives.
///
/// Once the script runs out, the default outcome applies. An optional
/// simulated latency makes concurrency observable under a paused runtime.
pub struct MockTransport {
    script: Mutex<VecDeque<Outcome>>,
    default: Outcome,
    latency: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// A transport that always answers with the given HTTP status.
    pub fn always(status: u16) -> Self {
        Self::with_default(Outcome::Status(status))
    }

    /// A transport that always fails with a connection error.
    pub fn unreachable() -> Self {
        Self::with_default(Outcome::ConnectionError("connection refused".into()))
    }

    /// A transport that replays the given outcomes, then answers 200.
    pub fn scripted(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut transport = Self::with_default(Outcome::Status(200));
        transport.script = Mutex::new(outcomes.into_iter().collect());
        transport
    }

    fn with_default(default: Outcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default,
            latency: None,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Adds simulated per-request latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Highest number of requests that were ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Outcome {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait::async_trait]
impl WebhookTransport for MockTransport {
    async fn deliver(&self, request: &DeliveryRequest) -> campus_webhook::Result<DeliveryResponse> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        self.requests.lock().unwrap().push(RecordedRequest {
            url: request.url.clone(),
            event: request.event.clone(),
            data: request.data.clone(),
            secret: request.secret.clone(),
            attempt: request.attempt,
        });

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.next_outcome() {
            Outcome::Status(code) => Ok(DeliveryResponse::new(
                request.request_id,
                code,
                "",
                Timestamp::now(),
            )),
            Outcome::ConnectionError(message) => {
                Err(campus_webhook::Error::network_error().with_message(message))
            }
        }
    }

    async fn health_check(&self) -> campus_webhook::Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}

/// Store wrapper that fails selected operations and delegates the rest to
/// an in-memory store.
///
/// Lets tests verify that the delivery engine's persistence side effects
/// stay independent of each other and of the retry loop.
pub struct UnreliableStore {
    inner: MemoryStore,
    fail_insert_delivery: bool,
    fail_record_trigger: bool,
}

impl UnreliableStore {
    /// Wraps an in-memory store without any failures armed.
    pub fn wrapping(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_insert_delivery: false,
            fail_record_trigger: false,
        }
    }

    /// Makes every `insert_delivery` call fail.
    pub fn failing_inserts(mut self) -> Self {
        self.fail_insert_delivery = true;
        self
    }

    /// Makes every `record_trigger` call fail.
    pub fn failing_health_updates(mut self) -> Self {
        self.fail_record_trigger = true;
        self
    }

    fn unavailable(operation: &str) -> campus_webhook::Error {
        campus_webhook::Error::service_unavailable()
            .with_message(format!("{operation} is unavailable"))
    }
}

#[async_trait::async_trait]
impl WebhookStore for UnreliableStore {
    async fn create(&self, webhook: NewWebhook) -> campus_webhook::Result<Webhook> {
        self.inner.create(webhook).await
    }

    async fn get(&self, webhook_id: Uuid) -> campus_webhook::Result<Webhook> {
        self.inner.get(webhook_id).await
    }

    async fn list(&self) -> campus_webhook::Result<Vec<Webhook>> {
        self.inner.list().await
    }

    async fn update(
        &self,
        webhook_id: Uuid,
        changes: UpdateWebhook,
    ) -> campus_webhook::Result<Webhook> {
        self.inner.update(webhook_id, changes).await
    }

    async fn delete(&self, webhook_id: Uuid) -> campus_webhook::Result<()> {
        self.inner.delete(webhook_id).await
    }

    async fn list_active_for_event(&self, event: &str) -> campus_webhook::Result<Vec<Webhook>> {
        self.inner.list_active_for_event(event).await
    }

    async fn record_trigger(
        &self,
        webhook_id: Uuid,
        success: bool,
    ) -> campus_webhook::Result<Webhook> {
        if self.fail_record_trigger {
            return Err(Self::unavailable("record_trigger"));
        }
        self.inner.record_trigger(webhook_id, success).await
    }

    async fn insert_delivery(
        &self,
        delivery: NewWebhookDelivery,
    ) -> campus_webhook::Result<WebhookDelivery> {
        if self.fail_insert_delivery {
            return Err(Self::unavailable("insert_delivery"));
        }
        self.inner.insert_delivery(delivery).await
    }

    async fn list_deliveries(
        &self,
        webhook_id: Uuid,
        page: Pagination,
    ) -> campus_webhook::Result<Vec<WebhookDelivery>> {
        self.inner.list_deliveries(webhook_id, page).await
    }
}

/// Builds a registration for a webhook subscribed to the given events.
pub fn registration(name: &str, events: &[&str]) -> NewWebhook {
    NewWebhook::new(
        name,
        Url::parse(&format!("https://example.edu/hooks/{name}")).unwrap(),
        events
            .iter()
            .map(|e| e.to_string())
            .collect::<HashSet<String>>(),
    )
}

//! Record store seam for webhook subscriptions and delivery history.
//!
//! The hosted record backend is reached through the [`WebhookStore`] trait;
//! an in-memory implementation backs tests and single-node deployments.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use campus_core::Result;
use uuid::Uuid;

use crate::types::{NewWebhook, NewWebhookDelivery, UpdateWebhook, Webhook, WebhookDelivery};

/// Tracing target for store operations.
pub const TRACING_TARGET: &str = "campus_webhook::store";

/// Default page size for delivery-history queries.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Offset/limit pagination for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of records to skip.
    pub offset: usize,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Creates a pagination window.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// Persistence operations required by the webhook subsystem.
///
/// `record_trigger` is the one operation with read-modify-write semantics:
/// implementations must apply the success-rate update atomically so that
/// near-simultaneous attempts for the same webhook cannot lose updates.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    /// Registers a new webhook and returns the stored record.
    async fn create(&self, webhook: NewWebhook) -> Result<Webhook>;

    /// Fetches a webhook by id.
    async fn get(&self, webhook_id: Uuid) -> Result<Webhook>;

    /// Lists all registered webhooks.
    async fn list(&self) -> Result<Vec<Webhook>>;

    /// Applies a changeset to a webhook and returns the updated record.
    async fn update(&self, webhook_id: Uuid, changes: UpdateWebhook) -> Result<Webhook>;

    /// Removes a webhook. Its delivery history is left for retention policy.
    async fn delete(&self, webhook_id: Uuid) -> Result<()>;

    /// Selects active webhooks subscribed to the given event name.
    async fn list_active_for_event(&self, event: &str) -> Result<Vec<Webhook>>;

    /// Atomically applies one delivery attempt's outcome to a webhook's
    /// health and returns the post-update record.
    async fn record_trigger(&self, webhook_id: Uuid, success: bool) -> Result<Webhook>;

    /// Appends one immutable delivery record.
    async fn insert_delivery(&self, delivery: NewWebhookDelivery) -> Result<WebhookDelivery>;

    /// Lists a webhook's delivery records, newest first.
    async fn list_deliveries(
        &self,
        webhook_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<WebhookDelivery>>;
}

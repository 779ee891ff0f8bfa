//! In-memory record store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use campus_core::{Error, Result};
use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Pagination, TRACING_TARGET, WebhookStore};
use crate::types::{NewWebhook, NewWebhookDelivery, UpdateWebhook, Webhook, WebhookDelivery};

#[derive(Debug, Default)]
struct MemoryStoreInner {
    webhooks: HashMap<Uuid, Webhook>,
    deliveries: HashMap<Uuid, Vec<WebhookDelivery>>,
}

/// In-memory [`WebhookStore`] backed by a `RwLock`-guarded map.
///
/// Health updates run under the write lock, which makes `record_trigger`
/// atomic: two concurrent attempts for the same webhook serialize their
/// read-modify-write instead of losing one of the updates.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(webhook_id: Uuid) -> Error {
        Error::not_found().with_message(format!("webhook {webhook_id} does not exist"))
    }
}

#[async_trait]
impl WebhookStore for MemoryStore {
    async fn create(&self, webhook: NewWebhook) -> Result<Webhook> {
        let webhook = webhook.into_webhook();

        let mut inner = self.inner.write().await;
        inner.webhooks.insert(webhook.id, webhook.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            webhook_id = %webhook.id,
            display_name = %webhook.display_name,
            "Webhook registered"
        );

        Ok(webhook)
    }

    async fn get(&self, webhook_id: Uuid) -> Result<Webhook> {
        let inner = self.inner.read().await;
        inner
            .webhooks
            .get(&webhook_id)
            .cloned()
            .ok_or_else(|| Self::not_found(webhook_id))
    }

    async fn list(&self) -> Result<Vec<Webhook>> {
        let inner = self.inner.read().await;
        let mut webhooks: Vec<Webhook> = inner.webhooks.values().cloned().collect();
        webhooks.sort_by_key(|w| w.created_at);
        Ok(webhooks)
    }

    async fn update(&self, webhook_id: Uuid, changes: UpdateWebhook) -> Result<Webhook> {
        let mut inner = self.inner.write().await;
        let webhook = inner
            .webhooks
            .get_mut(&webhook_id)
            .ok_or_else(|| Self::not_found(webhook_id))?;

        changes.apply(webhook);
        Ok(webhook.clone())
    }

    async fn delete(&self, webhook_id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .webhooks
            .remove(&webhook_id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(webhook_id))
    }

    async fn list_active_for_event(&self, event: &str) -> Result<Vec<Webhook>> {
        let inner = self.inner.read().await;
        Ok(inner
            .webhooks
            .values()
            .filter(|w| w.is_active() && w.subscribes_to(event))
            .cloned()
            .collect())
    }

    async fn record_trigger(&self, webhook_id: Uuid, success: bool) -> Result<Webhook> {
        let mut inner = self.inner.write().await;
        let webhook = inner
            .webhooks
            .get_mut(&webhook_id)
            .ok_or_else(|| Self::not_found(webhook_id))?;

        webhook.apply_trigger(success, Timestamp::now());
        Ok(webhook.clone())
    }

    async fn insert_delivery(&self, delivery: NewWebhookDelivery) -> Result<WebhookDelivery> {
        let delivery = delivery.into_delivery();

        let mut inner = self.inner.write().await;
        inner
            .deliveries
            .entry(delivery.webhook_id)
            .or_default()
            .push(delivery.clone());

        Ok(delivery)
    }

    async fn list_deliveries(
        &self,
        webhook_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<WebhookDelivery>> {
        let inner = self.inner.read().await;
        let Some(deliveries) = inner.deliveries.get(&webhook_id) else {
            return Ok(Vec::new());
        };

        Ok(deliveries
            .iter()
            .rev()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect())
    }
}

//! Trigger dispatcher: event matching and supervised fan-out.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use campus_core::Result;

use crate::WebhookTransport;
use crate::config::DispatcherConfig;
use crate::engine::DeliveryEngine;
use crate::store::WebhookStore;

/// Tracing target for dispatch operations.
pub const TRACING_TARGET: &str = "campus_webhook::dispatch";

/// Event name used by the synthetic test-delivery operation.
pub const TEST_EVENT: &str = "webhook.test";

/// Matches platform events against registered webhooks and supervises the
/// resulting delivery chains.
///
/// [`Dispatcher::trigger`] is fire-and-forget: nothing is returned and no
/// error ever propagates to the triggering code. Each matched webhook gets
/// its own chain, spawned onto a [`TaskTracker`] and bounded by a semaphore
/// so a broadly subscribed event cannot exhaust the process. The dispatcher
/// owns its lifecycle explicitly: call [`Dispatcher::close`] followed by
/// [`Dispatcher::wait`] for a graceful shutdown that lets in-flight chains
/// finish.
#[derive(Clone)]
pub struct Dispatcher {
    engine: DeliveryEngine,
    store: Arc<dyn WebhookStore>,
    tracker: TaskTracker,
    limiter: Arc<Semaphore>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending_chains", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over a transport and a record store.
    pub fn new(
        transport: Arc<dyn WebhookTransport>,
        store: Arc<dyn WebhookStore>,
        config: DispatcherConfig,
    ) -> Self {
        let engine = DeliveryEngine::new(transport, Arc::clone(&store));
        Self {
            engine,
            store,
            tracker: TaskTracker::new(),
            limiter: Arc::new(Semaphore::new(config.effective_max_concurrency())),
        }
    }

    /// Notifies every active, subscribed webhook of an event.
    ///
    /// Fire-and-forget: selection failures are logged and swallowed, and
    /// the delivery chains run concurrently in the background. A failure in
    /// one subscriber's chain never affects another's.
    pub async fn trigger(&self, event: &str, payload: Value) {
        let matched = match self.store.list_active_for_event(event).await {
            Ok(webhooks) => webhooks,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    event,
                    error = %error,
                    "Failed to select webhooks for event"
                );
                return;
            }
        };

        if matched.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET,
                event,
                "No active webhooks subscribed to event"
            );
            return;
        }

        tracing::info!(
            target: TRACING_TARGET,
            event,
            webhook_count = matched.len(),
            "Dispatching event to subscribed webhooks"
        );

        for webhook in matched {
            self.spawn_chain(webhook, event.to_string(), payload.clone());
        }
    }

    /// Sends a synthetic `webhook.test` event to one webhook through the
    /// normal delivery path, regardless of its event subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook does not exist; the delivery itself
    /// remains fire-and-forget.
    pub async fn send_test_event(&self, webhook_id: Uuid) -> Result<()> {
        let webhook = self.store.get(webhook_id).await?;

        let payload = serde_json::json!({
            "webhook_id": webhook.id,
            "test": true,
        });
        self.spawn_chain(webhook, TEST_EVENT.to_string(), payload);
        Ok(())
    }

    fn spawn_chain(&self, webhook: crate::types::Webhook, event: String, payload: Value) {
        if self.tracker.is_closed() {
            tracing::debug!(
                target: TRACING_TARGET,
                webhook_id = %webhook.id,
                event,
                "Dropping delivery chain, dispatcher is shut down"
            );
            return;
        }

        let engine = self.engine.clone();
        let limiter = Arc::clone(&self.limiter);

        self.tracker.spawn(async move {
            // The semaphore is never closed, so acquisition only fails if
            // the dispatcher itself is gone.
            let Ok(_permit) = limiter.acquire_owned().await else {
                return;
            };
            engine.deliver(&webhook, &event, payload).await;
        });
    }

    /// Number of delivery chains that have been spawned and not yet finished.
    pub fn pending_chains(&self) -> usize {
        self.tracker.len()
    }

    /// Stops accepting new delivery chains. Chains already spawned keep
    /// running until they succeed or exhaust their retries.
    pub fn close(&self) {
        self.tracker.close();
    }

    /// Waits for all in-flight delivery chains to finish.
    ///
    /// [`Dispatcher::close`] must be called first, otherwise this waits
    /// forever for chains that may still be spawned.
    pub async fn wait(&self) {
        self.tracker.wait().await;
    }
}

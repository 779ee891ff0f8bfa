//! Delivery engine: attempt execution, retry with backoff, and the audit
//! side effects of each attempt.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::WebhookTransport;
use crate::request::DeliveryRequest;
use crate::store::WebhookStore;
use crate::types::{NewWebhookDelivery, Webhook, WebhookStatus};

/// Tracing target for delivery operations.
pub const TRACING_TARGET: &str = "campus_webhook::delivery";

/// Computes the backoff delay inserted after a failed attempt.
///
/// The delay before attempt `n + 1` is `2^n` seconds, where `n` is the
/// attempt that just failed: 2s, 4s, 8s and so on.
pub fn backoff_delay(failed_attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(failed_attempt))
}

/// Records the status reported by a health update. Returns whether this is
/// the transition into [`WebhookStatus::Failed`], so a chain whose webhook
/// was demoted on an earlier attempt does not report the demotion again.
fn note_demotion(observed: &mut WebhookStatus, updated: WebhookStatus) -> bool {
    let demoted = updated == WebhookStatus::Failed && *observed != WebhookStatus::Failed;
    *observed = updated;
    demoted
}

/// Executes delivery chains: one HTTP attempt at a time, an audit record and
/// a health update per attempt, and exponential backoff between attempts.
///
/// The engine never returns errors to its caller. Transport failures become
/// failed attempts; persistence failures are logged to the operational log
/// and do not interrupt the chain.
#[derive(Clone)]
pub struct DeliveryEngine {
    transport: Arc<dyn WebhookTransport>,
    store: Arc<dyn WebhookStore>,
}

impl std::fmt::Debug for DeliveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryEngine").finish_non_exhaustive()
    }
}

impl DeliveryEngine {
    /// Creates an engine over a transport and a record store.
    pub fn new(transport: Arc<dyn WebhookTransport>, store: Arc<dyn WebhookStore>) -> Self {
        Self { transport, store }
    }

    /// Runs one delivery chain to completion: first attempt immediately,
    /// retries after backoff, stopping on success or once `retry_count`
    /// attempts have been made.
    ///
    /// The webhook snapshot taken at trigger time is used for every attempt
    /// in the chain, so mid-chain edits (secret rotation, URL changes) only
    /// affect future events.
    pub async fn deliver(&self, webhook: &Webhook, event: &str, payload: serde_json::Value) {
        let max_attempts = webhook.retry_count.max(1);
        let mut observed_status = webhook.status;

        for attempt in 1..=max_attempts {
            if self
                .attempt_once(webhook, event, &payload, attempt, &mut observed_status)
                .await
            {
                return;
            }

            if attempt >= max_attempts {
                tracing::warn!(
                    target: TRACING_TARGET,
                    webhook_id = %webhook.id,
                    event,
                    attempts = max_attempts,
                    "Delivery retries exhausted"
                );
                return;
            }

            tokio::time::sleep(backoff_delay(attempt)).await;
        }
    }

    /// Performs a single delivery attempt and applies its side effects.
    ///
    /// Returns whether the attempt succeeded. Both the audit insert and the
    /// health update are best-effort and independent of each other.
    async fn attempt_once(
        &self,
        webhook: &Webhook,
        event: &str,
        payload: &serde_json::Value,
        attempt: u32,
        observed_status: &mut WebhookStatus,
    ) -> bool {
        let request = DeliveryRequest::for_attempt(webhook, event, payload.clone(), attempt);

        tracing::debug!(
            target: TRACING_TARGET,
            webhook_id = %webhook.id,
            request_id = %request.request_id,
            url = %request.url,
            event,
            attempt,
            "Delivering webhook"
        );

        let started = Instant::now();
        let outcome = self.transport.deliver(&request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (success, response_code, response_body) = match outcome {
            Ok(response) => {
                let success = response.is_success();
                (success, Some(response.status_code), Some(response.body))
            }
            Err(error) => (false, None, Some(error.to_string())),
        };

        if success {
            tracing::debug!(
                target: TRACING_TARGET,
                webhook_id = %webhook.id,
                request_id = %request.request_id,
                status_code = ?response_code,
                duration_ms,
                attempt,
                "Webhook delivered successfully"
            );
        } else {
            tracing::warn!(
                target: TRACING_TARGET,
                webhook_id = %webhook.id,
                request_id = %request.request_id,
                status_code = ?response_code,
                error = response_body.as_deref().unwrap_or_default(),
                duration_ms,
                attempt,
                "Webhook delivery attempt failed"
            );
        }

        self.log_delivery(
            webhook,
            event,
            payload,
            response_code,
            response_body,
            success,
            duration_ms,
            attempt,
        )
        .await;
        self.track_health(webhook, success, observed_status).await;

        success
    }

    /// Appends the audit record for one attempt. Failures are reported to
    /// the operational log and swallowed.
    #[allow(clippy::too_many_arguments)]
    async fn log_delivery(
        &self,
        webhook: &Webhook,
        event: &str,
        payload: &serde_json::Value,
        response_code: Option<u16>,
        response_body: Option<String>,
        success: bool,
        duration_ms: u64,
        attempt: u32,
    ) {
        let record = NewWebhookDelivery {
            webhook_id: webhook.id,
            event: event.to_string(),
            payload: payload.clone(),
            response_code,
            response_body,
            success,
            duration_ms,
            attempt,
        };

        if let Err(error) = self.store.insert_delivery(record).await {
            tracing::error!(
                target: TRACING_TARGET,
                webhook_id = %webhook.id,
                event,
                attempt,
                error = %error,
                "Failed to log delivery record"
            );
        }
    }

    /// Updates the webhook's rolling success rate. Failures are reported to
    /// the operational log and swallowed.
    async fn track_health(
        &self,
        webhook: &Webhook,
        success: bool,
        observed_status: &mut WebhookStatus,
    ) {
        match self.store.record_trigger(webhook.id, success).await {
            Ok(updated) => {
                if note_demotion(observed_status, updated.status) {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        webhook_id = %webhook.id,
                        success_rate = updated.success_rate,
                        "Webhook demoted to failed after success rate dropped below threshold"
                    );
                }
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    webhook_id = %webhook.id,
                    error = %error,
                    "Failed to update webhook health"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_exponential() {
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
        assert_eq!(backoff_delay(4), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        assert_eq!(backoff_delay(200), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_demotion_noted_once_per_chain() {
        let mut observed = WebhookStatus::Active;
        assert!(note_demotion(&mut observed, WebhookStatus::Failed));
        assert!(!note_demotion(&mut observed, WebhookStatus::Failed));
        assert!(!note_demotion(&mut observed, WebhookStatus::Failed));
    }

    #[test]
    fn test_already_failed_webhook_is_not_renoted() {
        let mut observed = WebhookStatus::Failed;
        assert!(!note_demotion(&mut observed, WebhookStatus::Failed));
        assert!(!note_demotion(&mut observed, WebhookStatus::Active));
    }
}

//! Domain types for webhook subscriptions and delivery records.

mod delivery;
mod webhook;

pub use delivery::{NewWebhookDelivery, WebhookDelivery};
pub use webhook::{
    DEFAULT_RETRY_COUNT, DEFAULT_TIMEOUT_MS, FAILURE_RATE_THRESHOLD, NewWebhook, RATE_CEILING,
    RATE_FAILURE_DECREMENT, RATE_FLOOR, RATE_SUCCESS_INCREMENT, UpdateWebhook, Webhook,
    WebhookStatus,
};

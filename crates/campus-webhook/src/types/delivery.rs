//! Immutable audit records for delivery attempts.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit record of one delivery attempt toward a webhook endpoint.
///
/// Exactly one record is written per attempt, by the delivery engine only.
/// Records are never mutated or deleted by this subsystem; retention is an
/// external concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookDelivery {
    /// Unique, time-ordered identifier for this attempt.
    pub id: Uuid,
    /// The webhook this attempt was made for.
    pub webhook_id: Uuid,
    /// The event name that triggered this attempt.
    pub event: String,
    /// The event data that was sent, kept for inspection and debugging.
    pub payload: serde_json::Value,
    /// HTTP status code, absent when the request failed before a response.
    pub response_code: Option<u16>,
    /// Response body, or the transport error message when no response exists.
    pub response_body: Option<String>,
    /// Whether the endpoint answered with a 2xx status.
    pub success: bool,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: u64,
    /// 1-based ordinal of this attempt within its retry sequence.
    pub attempt: u32,
    /// When the attempt completed.
    pub delivered_at: Timestamp,
}

/// Fields captured by the delivery engine after an attempt completes.
#[derive(Debug, Clone)]
pub struct NewWebhookDelivery {
    /// The webhook this attempt was made for.
    pub webhook_id: Uuid,
    /// The event name that triggered this attempt.
    pub event: String,
    /// The event data that was sent.
    pub payload: serde_json::Value,
    /// HTTP status code, if a response was obtained.
    pub response_code: Option<u16>,
    /// Response body or transport error message.
    pub response_body: Option<String>,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: u64,
    /// 1-based attempt ordinal.
    pub attempt: u32,
}

impl NewWebhookDelivery {
    /// Materializes the audit record, assigning its id and timestamp.
    pub fn into_delivery(self) -> WebhookDelivery {
        WebhookDelivery {
            id: Uuid::now_v7(),
            webhook_id: self.webhook_id,
            event: self.event,
            payload: self.payload,
            response_code: self.response_code,
            response_body: self.response_body,
            success: self.success,
            duration_ms: self.duration_ms,
            attempt: self.attempt,
            delivered_at: Timestamp::now(),
        }
    }
}

//! Delivery response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of response-body characters retained for audit records.
pub const MAX_BODY_CHARS: usize = 4_096;

/// Response from a completed HTTP exchange with a webhook endpoint.
///
/// Transport-level failures (timeouts, connection errors) never produce a
/// response; they surface as transport errors instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResponse {
    /// Unique identifier for this response.
    pub response_id: Uuid,
    /// Request ID this response corresponds to.
    pub request_id: Uuid,
    /// HTTP status code from the webhook endpoint.
    pub status_code: u16,
    /// Response body, truncated to [`MAX_BODY_CHARS`].
    pub body: String,
    /// Timestamp when the request was initiated.
    pub started_at: Timestamp,
    /// Timestamp when the response was received.
    pub finished_at: Timestamp,
}

impl DeliveryResponse {
    /// Creates a new delivery response, truncating the body for retention.
    pub fn new(
        request_id: Uuid,
        status_code: u16,
        body: impl Into<String>,
        started_at: Timestamp,
    ) -> Self {
        let mut body = body.into();
        if body.chars().count() > MAX_BODY_CHARS {
            body = body.chars().take(MAX_BODY_CHARS).collect();
        }
        Self {
            response_id: Uuid::now_v7(),
            request_id,
            status_code,
            body,
            started_at,
            finished_at: Timestamp::now(),
        }
    }

    /// Returns whether the delivery was successful (2xx status code).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Calculates the response time as a duration.
    pub fn duration(&self) -> jiff::SignedDuration {
        self.finished_at.duration_since(self.started_at)
    }
}

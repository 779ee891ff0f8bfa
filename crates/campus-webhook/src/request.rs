//! Delivery request and wire payload types.

use std::collections::HashMap;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::types::Webhook;

/// One delivery attempt's worth of transport input.
///
/// A request captures everything the transport needs from the webhook at the
/// moment the chain started, so that concurrent edits to the subscription
/// (secret rotation in particular) do not affect attempts already in flight.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    /// Unique identifier for this request.
    pub request_id: Uuid,
    /// The webhook endpoint URL.
    pub url: Url,
    /// The event name that triggered this delivery.
    pub event: String,
    /// Event data forwarded to the subscriber.
    pub data: serde_json::Value,
    /// Shared secret sent verbatim in the secret header.
    pub secret: String,
    /// 1-based attempt ordinal within the retry sequence.
    pub attempt: u32,
    /// Static headers merged into the request.
    pub headers: HashMap<String, String>,
    /// Per-attempt network timeout.
    pub timeout: Duration,
}

impl DeliveryRequest {
    /// Builds the request for a given attempt from a webhook snapshot.
    pub fn for_attempt(
        webhook: &Webhook,
        event: impl Into<String>,
        data: serde_json::Value,
        attempt: u32,
    ) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            url: webhook.url.clone(),
            event: event.into(),
            data,
            secret: webhook.secret.clone(),
            attempt,
            headers: webhook.headers.clone(),
            timeout: webhook.timeout(),
        }
    }

    /// Creates the wire payload for this request, stamped with the current time.
    pub fn to_payload(&self) -> DeliveryPayload {
        DeliveryPayload {
            event: self.event.clone(),
            timestamp: Timestamp::now(),
            data: self.data.clone(),
        }
    }
}

/// The JSON body sent to webhook endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPayload {
    /// The event name that triggered this delivery.
    pub event: String,
    /// When the payload was created (ISO-8601 on the wire).
    pub timestamp: Timestamp,
    /// Event data forwarded to the subscriber.
    pub data: serde_json::Value,
}

//! Webhook subscription model and lifecycle rules.
//!
//! A [`Webhook`] is a subscriber-registered HTTP callback bound to a set of
//! event names. Each webhook maintains its own delivery health through a
//! rolling success rate; endpoints that fail chronically are demoted to
//! [`WebhookStatus::Failed`] automatically and stay there until an operator
//! reactivates them.

use std::collections::{HashMap, HashSet};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use url::Url;
use uuid::Uuid;

use crate::secret;

/// Default maximum delivery attempts per event occurrence.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default per-attempt network timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Amount added to the success rate on a successful delivery attempt.
pub const RATE_SUCCESS_INCREMENT: f64 = 0.1;

/// Amount subtracted from the success rate on a failed delivery attempt.
///
/// Deliberately larger than [`RATE_SUCCESS_INCREMENT`] so that failures
/// degrade a webhook's standing faster than successes restore it.
pub const RATE_FAILURE_DECREMENT: f64 = 1.0;

/// Success rate below which a webhook is automatically marked failed.
pub const FAILURE_RATE_THRESHOLD: f64 = 50.0;

/// Upper clamp for the success rate.
pub const RATE_CEILING: f64 = 100.0;

/// Lower clamp for the success rate.
pub const RATE_FLOOR: f64 = 0.0;

/// Operational status of a webhook subscription.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    /// Webhook is active and will receive events
    #[default]
    Active,
    /// Webhook is temporarily paused by an operator
    Paused,
    /// Webhook was demoted after its success rate fell below the threshold
    Failed,
}

impl WebhookStatus {
    /// Returns whether the webhook is active and receiving events.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, WebhookStatus::Active)
    }

    /// Returns whether the webhook is paused.
    #[inline]
    pub fn is_paused(self) -> bool {
        matches!(self, WebhookStatus::Paused)
    }

    /// Returns whether the webhook was auto-demoted.
    #[inline]
    pub fn is_failed(self) -> bool {
        matches!(self, WebhookStatus::Failed)
    }

    /// Returns whether an operator can transition the webhook back to active.
    #[inline]
    pub fn can_activate(self) -> bool {
        matches!(self, WebhookStatus::Paused | WebhookStatus::Failed)
    }
}

/// A webhook subscription registered by a tenant owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    /// Unique webhook identifier.
    pub id: Uuid,
    /// Human-readable name for the webhook.
    pub display_name: String,
    /// Destination endpoint URL (external, untrusted).
    pub url: Url,
    /// Event names this subscription cares about.
    pub events: HashSet<String>,
    /// Current status of the webhook.
    pub status: WebhookStatus,
    /// Shared secret sent with every delivery for payload authentication.
    pub secret: String,
    /// Rolling success-rate estimate in `[0, 100]`.
    pub success_rate: f64,
    /// Timestamp of the most recent delivery attempt, successful or not.
    pub last_triggered_at: Option<Timestamp>,
    /// Maximum delivery attempts per event occurrence.
    pub retry_count: u32,
    /// Per-attempt network timeout in milliseconds.
    pub timeout_ms: u64,
    /// Static headers merged into every delivery request.
    pub headers: HashMap<String, String>,
    /// Timestamp when this webhook was created.
    pub created_at: Timestamp,
    /// Timestamp when this webhook was last modified.
    pub updated_at: Timestamp,
}

impl Webhook {
    /// Returns whether the webhook is active and receiving events.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns whether the webhook subscribes to a specific event name.
    pub fn subscribes_to(&self, event: &str) -> bool {
        self.events.contains(event)
    }

    /// Returns whether the webhook has been triggered at least once.
    pub fn has_been_triggered(&self) -> bool {
        self.last_triggered_at.is_some()
    }

    /// Returns the per-attempt timeout as a [`std::time::Duration`].
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// Applies the outcome of one delivery attempt to this webhook's health.
    ///
    /// Successes nudge the rate up by [`RATE_SUCCESS_INCREMENT`] (capped at
    /// [`RATE_CEILING`]); failures pull it down by [`RATE_FAILURE_DECREMENT`]
    /// (floored at [`RATE_FLOOR`]). `last_triggered_at` is always refreshed.
    /// If the new rate is below [`FAILURE_RATE_THRESHOLD`] the status is
    /// forced to [`WebhookStatus::Failed`]; no other transition happens here.
    pub fn apply_trigger(&mut self, success: bool, now: Timestamp) {
        self.success_rate = if success {
            (self.success_rate + RATE_SUCCESS_INCREMENT).min(RATE_CEILING)
        } else {
            (self.success_rate - RATE_FAILURE_DECREMENT).max(RATE_FLOOR)
        };
        self.last_triggered_at = Some(now);

        if self.success_rate < FAILURE_RATE_THRESHOLD {
            self.status = WebhookStatus::Failed;
        }
        self.updated_at = now;
    }
}

/// Data structure for registering a new webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWebhook {
    /// Human-readable name for the webhook.
    pub display_name: String,
    /// Destination endpoint URL.
    pub url: Url,
    /// Event names this subscription cares about.
    pub events: HashSet<String>,
    /// Static headers merged into every delivery request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Maximum delivery attempts per event occurrence.
    pub retry_count: Option<u32>,
    /// Per-attempt network timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl NewWebhook {
    /// Creates a registration request with default retry and timeout settings.
    pub fn new(display_name: impl Into<String>, url: Url, events: HashSet<String>) -> Self {
        Self {
            display_name: display_name.into(),
            url,
            events,
            headers: HashMap::new(),
            retry_count: None,
            timeout_ms: None,
        }
    }

    /// Materializes the webhook record, generating its id and secret.
    pub fn into_webhook(self) -> Webhook {
        let now = Timestamp::now();
        Webhook {
            id: Uuid::new_v4(),
            display_name: self.display_name,
            url: self.url,
            events: self.events,
            status: WebhookStatus::Active,
            secret: secret::generate(),
            success_rate: RATE_CEILING,
            last_triggered_at: None,
            retry_count: self.retry_count.unwrap_or(DEFAULT_RETRY_COUNT),
            timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            headers: self.headers,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Data structure for updating an existing webhook.
///
/// Unset fields are left unchanged. Setting `secret` is how rotation is
/// persisted; deliveries already in flight keep the secret they captured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWebhook {
    /// Updated name for the webhook.
    pub display_name: Option<String>,
    /// Updated endpoint URL.
    pub url: Option<Url>,
    /// Updated event subscriptions.
    pub events: Option<HashSet<String>>,
    /// Updated status (operator-driven transitions only).
    pub status: Option<WebhookStatus>,
    /// Replacement secret, typically from [`crate::secret::generate`].
    pub secret: Option<String>,
    /// Updated static headers.
    pub headers: Option<HashMap<String, String>>,
    /// Updated maximum delivery attempts.
    pub retry_count: Option<u32>,
    /// Updated per-attempt timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl UpdateWebhook {
    /// Applies the changeset to a webhook record in place.
    pub fn apply(self, webhook: &mut Webhook) {
        if let Some(display_name) = self.display_name {
            webhook.display_name = display_name;
        }
        if let Some(url) = self.url {
            webhook.url = url;
        }
        if let Some(events) = self.events {
            webhook.events = events;
        }
        if let Some(status) = self.status {
            webhook.status = status;
        }
        if let Some(secret) = self.secret {
            webhook.secret = secret;
        }
        if let Some(headers) = self.headers {
            webhook.headers = headers;
        }
        if let Some(retry_count) = self.retry_count {
            webhook.retry_count = retry_count;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            webhook.timeout_ms = timeout_ms;
        }
        webhook.updated_at = Timestamp::now();
    }
}

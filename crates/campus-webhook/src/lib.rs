#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod config;
mod dispatcher;
mod engine;
pub mod request;
pub mod response;
pub mod secret;
pub mod store;
pub mod types;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use campus_core::{Error, ErrorKind, Result, ServiceHealth, ServiceStatus};
pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, TEST_EVENT};
pub use engine::DeliveryEngine;
pub use request::{DeliveryPayload, DeliveryRequest};
pub use response::DeliveryResponse;
pub use store::{MemoryStore, Pagination, WebhookStore};
pub use types::{
    NewWebhook, NewWebhookDelivery, UpdateWebhook, Webhook, WebhookDelivery, WebhookStatus,
};

/// Tracing target for webhook operations.
pub const TRACING_TARGET: &str = "campus_webhook";

/// Core trait for webhook delivery transports.
///
/// Implement this trait to plug a custom HTTP stack (or a test double) into
/// the delivery engine. A transport performs exactly one attempt per call;
/// retries, audit records, and health tracking stay with the engine.
#[async_trait::async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Performs one HTTP POST toward the subscriber endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures (timeout,
    /// connection refused, serialization). A non-2xx response is a normal
    /// return value; the engine classifies it.
    async fn deliver(&self, request: &DeliveryRequest) -> Result<DeliveryResponse>;

    /// Performs a health check on the transport.
    async fn health_check(&self) -> Result<ServiceHealth>;
}

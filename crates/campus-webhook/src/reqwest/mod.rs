//! Reqwest-based HTTP transport for webhook delivery.
//!
//! This module provides a reqwest-based implementation of the
//! [`WebhookTransport`](crate::WebhookTransport) trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_webhook::reqwest::{ReqwestConfig, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new(ReqwestConfig::default());
//! let response = transport.deliver(&request).await?;
//! ```

mod client;
mod config;

pub use client::ReqwestTransport;
pub use config::ReqwestConfig;

/// Tracing target for reqwest transport operations.
pub const TRACING_TARGET: &str = "campus_webhook::reqwest";

//! Dispatcher configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default upper bound on concurrently running delivery chains.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Configuration for the trigger dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct DispatcherConfig {
    /// Maximum number of delivery chains running at once
    #[cfg_attr(
        feature = "config",
        arg(
            long = "webhook-max-concurrency",
            env = "WEBHOOK_MAX_CONCURRENCY",
            default_value = "16"
        )
    )]
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl DispatcherConfig {
    /// Returns the effective concurrency bound, using the default if zero.
    pub fn effective_max_concurrency(&self) -> usize {
        if self.max_concurrency == 0 {
            DEFAULT_MAX_CONCURRENCY
        } else {
            self.max_concurrency
        }
    }

    /// Sets the concurrency bound.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

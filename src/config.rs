//! Faucet configuration.
//!
//! Read once from a JSON file before any worker starts and never changed
//! afterwards.
use crate::application::queue::MAX_QUEUE_CAPACITY;
use crate::application::worker::WorkerSettings;
use crate::domain::notification::Denomination;
use crate::domain::work::DestinationId;
use crate::error::{FaucetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Default time between drains in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10_000;
/// Default number of unflushed requests per destination.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Default gas price attached to broadcast requests.
pub const DEFAULT_GAS_PRICES: &str = "0.0025uttnt";

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_gas_prices() -> String {
    DEFAULT_GAS_PRICES.to_string()
}

/// Top-level faucet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetConfig {
    /// Time between drains of each destination's batch.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Unflushed requests a destination may hold before producers stall.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Whether originators of a failed batch get a failure reply.
    #[serde(default)]
    pub notify_failures: bool,
    /// How amounts are presented in replies.
    #[serde(default)]
    pub denom: Denomination,
    /// One entry per destination; each gets its own worker.
    pub destinations: Vec<DestinationConfig>,
}

/// A payout destination and the client used to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Address prefix identifying the destination.
    pub prefix: DestinationId,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientConfig {
    /// An in-process ledger, for dry runs.
    Memory {
        #[serde(default)]
        account: Option<String>,
        #[serde(default)]
        balance: u64,
    },
    /// A node reached over HTTP.
    Http(HttpClientConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Node RPC endpoint, queried for the network identifier.
    pub rpc: String,
    /// Endpoint accepting multi-send broadcast requests.
    pub broadcast: String,
    /// Sending account address.
    #[serde(default)]
    pub account: Option<String>,
    /// Expected network identifier; checked against the node when set.
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default = "default_gas_prices")]
    pub gas_prices: String,
}

impl FaucetConfig {
    /// Loads and validates a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the time between drains.
    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Sets the per-destination queue capacity.
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            tick_interval: self.tick_interval(),
            notify_failures: self.notify_failures,
            denom: self.denom.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.destinations.is_empty() {
            return Err(FaucetError::ConfigError(
                "at least one destination must be configured".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(FaucetError::ConfigError(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(FaucetError::ConfigError(format!(
                "queue_capacity must not exceed {MAX_QUEUE_CAPACITY}"
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(FaucetError::ConfigError(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for destination in &self.destinations {
            if !seen.insert(&destination.prefix) {
                return Err(FaucetError::ConfigError(format!(
                    "destination {} is configured more than once",
                    destination.prefix
                )));
            }
        }
        Ok(())
    }
}

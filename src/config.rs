// Configuration module for kafka-cloudevents
//
// Settings are plain values fixed when a marshaller or producer is built.
// They can be read from the environment (CE_KAFKA_* variables); numeric
// values are clamped to the MIN/MAX bounds in kafka::constants.

use std::time::Duration;

use tracing::warn;

use crate::kafka::constants::{
    DEFAULT_DELIVERY_TIMEOUT_MS, DEFAULT_MOCK_PARTITIONS, ENV_DELIVERY_TIMEOUT_MS,
    ENV_KEY_STRATEGY, ENV_MOCK_PARTITIONS, MAX_DELIVERY_TIMEOUT_MS, MAX_MOCK_PARTITIONS,
    MIN_DELIVERY_TIMEOUT_MS, MIN_MOCK_PARTITIONS,
};

/// How a record key is derived when the caller does not supply one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStrategy {
    /// Records carry no key unless the caller sets one
    #[default]
    None,
    /// Use the event id as key
    Id,
    /// Use the event subject as key (no key when the subject is absent)
    Subject,
}

impl KeyStrategy {
    /// Parse from config string; unknown values fall back to `None`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "id" => KeyStrategy::Id,
            "subject" => KeyStrategy::Subject,
            "none" | "" => KeyStrategy::None,
            other => {
                warn!(value = %other, "Unknown key strategy, records will carry no derived key");
                KeyStrategy::None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStrategy::None => "none",
            KeyStrategy::Id => "id",
            KeyStrategy::Subject => "subject",
        }
    }
}

/// Configuration struct holding all kafka-cloudevents settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub key_strategy: KeyStrategy,
    /// Upper bound a transport client may spend delivering one record
    pub delivery_timeout_ms: u64,
    /// Partitions per topic assumed by the in-memory mock client
    pub mock_partitions: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            key_strategy: KeyStrategy::default(),
            delivery_timeout_ms: DEFAULT_DELIVERY_TIMEOUT_MS,
            mock_partitions: DEFAULT_MOCK_PARTITIONS,
        }
    }
}

impl Config {
    /// Load configuration from CE_KAFKA_* environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup(ENV_KEY_STRATEGY) {
            config.key_strategy = KeyStrategy::parse(&v);
        }

        if let Some(v) = lookup(ENV_DELIVERY_TIMEOUT_MS).and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.delivery_timeout_ms = v.clamp(MIN_DELIVERY_TIMEOUT_MS, MAX_DELIVERY_TIMEOUT_MS);
        }

        if let Some(v) = lookup(ENV_MOCK_PARTITIONS).and_then(|v| v.trim().parse::<i32>().ok()) {
            config.mock_partitions = v.clamp(MIN_MOCK_PARTITIONS, MAX_MOCK_PARTITIONS);
        }

        config
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

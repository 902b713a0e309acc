//! In-memory transport client
//!
//! `MockProducer` behaves like a single-broker cluster: records are placed
//! with the Kafka partitioner, each (topic, partition) gets its own offset
//! sequence starting at 0, and every delivered record is kept in a history
//! that tests can inspect. Failures can be scripted with
//! [`MockProducer::fail_next`].

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use super::constants::{MAX_MOCK_PARTITIONS, MIN_MOCK_PARTITIONS};
use super::error::{CloudEventError, Result};
use super::messages::{ProducerRecord, RecordMetadata};
use super::partitioner::partition_for;
use super::producer::Producer;
use crate::config::Config;

#[derive(Debug, Default)]
struct MockState {
    history: Vec<ProducerRecord>,
    /// Next offset per (topic, partition)
    offsets: HashMap<(String, i32), i64>,
    pending_errors: VecDeque<String>,
    closed: bool,
}

#[derive(Debug)]
pub struct MockProducer {
    partitions: i32,
    state: Mutex<MockState>,
}

impl Default for MockProducer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProducer {
    /// Mock client for single-partition topics
    pub fn new() -> Self {
        Self::with_partitions(MIN_MOCK_PARTITIONS)
    }

    /// Mock client where every topic has `partitions` partitions
    pub fn with_partitions(partitions: i32) -> Self {
        MockProducer {
            partitions: partitions.clamp(MIN_MOCK_PARTITIONS, MAX_MOCK_PARTITIONS),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_partitions(config.mock_partitions)
    }

    pub fn partitions(&self) -> i32 {
        self.partitions
    }

    /// Every record delivered so far, in delivery order
    pub fn history(&self) -> Vec<ProducerRecord> {
        self.state.lock().history.clone()
    }

    /// Forget delivered records and reset offsets
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.history.clear();
        state.offsets.clear();
    }

    /// Make the next send fail with `error`; calls queue up
    pub fn fail_next(&self, error: impl Into<String>) {
        self.state.lock().pending_errors.push_back(error.into());
    }

    /// Refuse every further send
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[async_trait]
impl Producer for MockProducer {
    async fn send(&self, record: ProducerRecord) -> Result<RecordMetadata> {
        let mut state = self.state.lock();

        let failure = if state.closed {
            Some("producer is closed".to_string())
        } else {
            state.pending_errors.pop_front()
        };
        if let Some(error) = failure {
            return Err(CloudEventError::Delivery {
                topic: record.topic,
                error,
            });
        }

        let partition = partition_for(&record, self.partitions);
        if partition < 0 || partition >= self.partitions {
            return Err(CloudEventError::Delivery {
                topic: record.topic,
                error: format!(
                    "partition {} out of range (topic has {} partitions)",
                    partition, self.partitions
                ),
            });
        }

        let next = state
            .offsets
            .entry((record.topic.clone(), partition))
            .or_insert(0);
        let offset = *next;
        *next += 1;

        let metadata = RecordMetadata {
            topic: record.topic.clone(),
            partition,
            offset,
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
        };

        debug!(
            topic = %metadata.topic,
            partition,
            offset,
            headers = record.headers.len(),
            "MockProducer accepted record"
        );

        state.history.push(record);
        Ok(metadata)
    }
}

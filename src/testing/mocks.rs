//! Mock transport clients
//!
//! [`crate::kafka::mock::MockProducer`] covers the happy path. The client here
//! fails every delivery so error propagation can be tested without scripting.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::kafka::error::{CloudEventError, Result};
use crate::kafka::messages::{ProducerRecord, RecordMetadata};
use crate::kafka::producer::Producer;

/// Transport client that rejects every record
pub struct RejectingProducer {
    error: String,
    attempts: AtomicUsize,
}

impl RejectingProducer {
    pub fn new(error: impl Into<String>) -> Self {
        RejectingProducer {
            error: error.into(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Producer for RejectingProducer {
    async fn send(&self, record: ProducerRecord) -> Result<RecordMetadata> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CloudEventError::Delivery {
            topic: record.topic,
            error: self.error.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::messages::Headers;

    #[tokio::test]
    async fn test_rejecting_producer_counts_attempts() {
        let client = RejectingProducer::new("nope");
        let record = ProducerRecord {
            topic: "t".to_string(),
            partition: None,
            key: None,
            headers: Headers::new(),
            value: None,
        };

        assert!(client.send(record.clone()).await.is_err());
        assert!(client.send(record).await.is_err());
        assert_eq!(client.attempts(), 2);
    }
}

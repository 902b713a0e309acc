//! Test helper functions
//!
//! Utility functions for creating test fixtures

use serde::{Deserialize, Serialize};

use crate::event::CloudEventBuilder;
use crate::kafka::messages::{ConsumerRecord, ProducerRecord};

/// Payload used throughout the binary-mode tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Much {
    pub wow: String,
}

impl Much {
    pub fn nice() -> Self {
        Much {
            wow: "nice!".to_string(),
        }
    }
}

/// Builder for the event with every required attribute, a subject, a JSON
/// content type and a `Much` payload
pub fn much_event() -> CloudEventBuilder<Much> {
    CloudEventBuilder::new()
        .id("x10")
        .source("/source")
        .event_type("event-type")
        .data_content_type("application/json")
        .subject("subject")
        .data(Much::nice())
}

/// Pretend a producer record was delivered at partition 0, offset 0
pub fn consumed(record: ProducerRecord) -> ConsumerRecord {
    ConsumerRecord {
        topic: record.topic,
        partition: 0,
        offset: 0,
        timestamp: None,
        key: record.key,
        headers: record.headers,
        value: record.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_much_event_defaults() {
        let event = much_event().build().unwrap();
        assert_eq!(event.id(), "x10");
        assert_eq!(event.subject(), Some("subject"));
        assert_eq!(event.data(), Some(&Much::nice()));
    }
}

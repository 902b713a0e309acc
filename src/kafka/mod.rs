// Kafka-side types and transport seam
//
// This module contains everything the marshaller shares with a Kafka client:
// - Record types (ProducerRecord, ConsumerRecord, Headers)
// - Header names and bounds (constants)
// - The Producer trait and the CloudEventsProducer facade
// - An in-memory MockProducer and the partitioner it uses
// - RecordBatch v2 encoding/decoding via kafka-protocol
// - A librdkafka-backed client behind the `rdkafka` feature
//
// Data flow:
// =========
//
//   CloudEvent --Marshaller::encode--> ProducerRecord --Producer::send--> RecordMetadata
//
//   ConsumerRecord --Marshaller::decode--> CloudEvent
//
// The marshaller itself lives in crate::marshaller and never performs I/O.

pub mod constants;
pub mod error;
pub mod messages;
pub mod mock;
pub mod partitioner;
pub mod producer;
pub mod protocol;

#[cfg(feature = "rdkafka")]
pub mod client;

// Re-export commonly used types for convenience
pub use error::{BoxError, CloudEventError, Result};
pub use messages::{ConsumerRecord, Headers, ProducerRecord, RecordHeader, RecordMetadata};
pub use mock::MockProducer;
pub use producer::{CloudEventsProducer, CloudEventsProducerBuilder, Producer};

#[cfg(feature = "rdkafka")]
pub use client::{consumer_record, ClientSettings, KafkaClient};

//! librdkafka transport client (feature `rdkafka`)
//!
//! [`KafkaClient`] implements [`Producer`] on top of rdkafka's
//! `FutureProducer`. [`consumer_record`] converts a message received by any
//! rdkafka consumer into a [`ConsumerRecord`] the marshaller can decode.
//!
//! ## OpenSSL
//!
//! librdkafka links the system OpenSSL. The `ssl-vendored` rdkafka feature is
//! not enabled here.

use std::time::Duration;

use ::rdkafka::config::ClientConfig;
use ::rdkafka::message::{Header, Headers as _, Message, OwnedHeaders};
use ::rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};
use ::rdkafka::util::Timeout;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::{CloudEventError, Result};
use super::messages::{ConsumerRecord, Headers, ProducerRecord, RecordHeader, RecordMetadata};
use super::producer::Producer;
use crate::config::Config;

/// Connection settings for [`KafkaClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub bootstrap_servers: String,
    pub client_id: String,
    /// Upper bound on delivery, including retries
    pub message_timeout_ms: u64,
    /// `acks` setting: "0", "1" or "all"
    pub acks: String,
}

impl ClientSettings {
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        let config = Config::default();
        ClientSettings {
            bootstrap_servers: bootstrap_servers.into(),
            client_id: "kafka-cloudevents".to_string(),
            message_timeout_ms: config.delivery_timeout_ms,
            acks: "all".to_string(),
        }
    }

    /// Take the delivery timeout from a [`Config`]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.message_timeout_ms = config.delivery_timeout_ms;
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn acks(mut self, acks: impl Into<String>) -> Self {
        self.acks = acks.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.bootstrap_servers.trim().is_empty() {
            return Err(CloudEventError::Configuration(
                "bootstrap.servers is empty".to_string(),
            ));
        }
        if !matches!(self.acks.as_str(), "0" | "1" | "all" | "-1") {
            return Err(CloudEventError::Configuration(format!(
                "invalid acks value: {}",
                self.acks
            )));
        }
        Ok(())
    }

    fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("client.id", &self.client_id)
            .set("message.timeout.ms", self.message_timeout_ms.to_string())
            .set("acks", &self.acks);
        client_config
    }
}

/// Kafka producer backed by librdkafka
pub struct KafkaClient {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaClient {
    /// # Errors
    ///
    /// `Configuration` for unusable settings or when librdkafka refuses to
    /// create the producer.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        settings.validate()?;

        let producer: FutureProducer = settings.client_config().create().map_err(|e| {
            CloudEventError::Configuration(format!("Failed to create producer: {}", e))
        })?;

        debug!(
            bootstrap_servers = %settings.bootstrap_servers,
            client_id = %settings.client_id,
            "Created Kafka producer"
        );

        Ok(KafkaClient {
            producer,
            timeout: Duration::from_millis(settings.message_timeout_ms),
        })
    }
}

#[async_trait]
impl Producer for KafkaClient {
    async fn send(&self, record: ProducerRecord) -> Result<RecordMetadata> {
        let headers = record
            .headers
            .iter()
            .fold(OwnedHeaders::new_with_capacity(record.headers.len()), |acc, h| {
                acc.insert(Header {
                    key: h.key.as_str(),
                    value: Some(&h.value[..]),
                })
            });

        let mut future_record: FutureRecord<'_, [u8], [u8]> =
            FutureRecord::to(&record.topic).headers(headers);
        if let Some(key) = record.key.as_deref() {
            future_record = future_record.key(key);
        }
        if let Some(value) = record.value.as_deref() {
            future_record = future_record.payload(value);
        }
        if let Some(partition) = record.partition {
            future_record = future_record.partition(partition);
        }

        match self
            .producer
            .send(future_record, Timeout::After(self.timeout))
            .await
        {
            Ok((partition, offset)) => Ok(RecordMetadata {
                topic: record.topic.clone(),
                partition,
                offset,
                timestamp: None,
            }),
            Err((err, _)) => {
                warn!(topic = %record.topic, error = %err, "Kafka delivery failed");
                Err(CloudEventError::Delivery {
                    topic: record.topic.clone(),
                    error: err.to_string(),
                })
            }
        }
    }

    /// Wait for queued records on a blocking thread
    ///
    /// librdkafka's flush blocks, so it never runs on an executor worker.
    async fn flush(&self) -> Result<()> {
        let producer = self.producer.clone();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)))
            .await
            .map_err(|e| CloudEventError::Delivery {
                topic: String::new(),
                error: format!("flush task failed: {}", e),
            })?
            .map_err(|e| CloudEventError::Delivery {
                topic: String::new(),
                error: format!("flush failed: {}", e),
            })
    }
}

/// Convert a message received by an rdkafka consumer
///
/// Header order is kept and repeated names stay repeated, so the decoder can
/// reject duplicated core attributes. A null header value becomes empty.
pub fn consumer_record<M: Message>(message: &M) -> ConsumerRecord {
    let headers: Headers = message
        .headers()
        .map(|hs| {
            hs.iter()
                .map(|h| RecordHeader::new(h.key, h.value.map(|v| v.to_vec()).unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default();

    ConsumerRecord {
        topic: message.topic().to_string(),
        partition: message.partition(),
        offset: message.offset(),
        timestamp: message.timestamp().to_millis(),
        key: message.key().map(bytes::Bytes::copy_from_slice),
        headers,
        value: message.payload().map(bytes::Bytes::copy_from_slice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rdkafka::message::{OwnedMessage, Timestamp};

    #[test]
    fn test_settings_validation() {
        assert!(ClientSettings::new("localhost:9092").validate().is_ok());
        assert!(ClientSettings::new("  ").validate().unwrap_err().is_configuration_error());
        assert!(ClientSettings::new("localhost:9092")
            .acks("most")
            .validate()
            .is_err());
    }

    #[test]
    fn test_settings_follow_config() {
        let config = Config {
            delivery_timeout_ms: 5_000,
            ..Config::default()
        };
        let settings = ClientSettings::new("localhost:9092")
            .with_config(&config)
            .client_id("orders");
        let client_config = settings.client_config();
        assert_eq!(client_config.get("message.timeout.ms"), Some("5000"));
        assert_eq!(client_config.get("client.id"), Some("orders"));
    }

    #[test]
    fn test_consumer_record_keeps_headers() {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: "ce_id",
                value: Some("x10"),
            })
            .insert(Header {
                key: "ce_id",
                value: Some("x11"),
            })
            .insert(Header::<&str> {
                key: "tracestate",
                value: None,
            });
        let message = OwnedMessage::new(
            Some(b"{}".to_vec()),
            Some(b"k".to_vec()),
            "binary.t".to_string(),
            Timestamp::CreateTime(1_700_000_000_000),
            2,
            9,
            Some(headers),
        );

        let record = consumer_record(&message);
        assert_eq!(record.topic, "binary.t");
        assert_eq!((record.partition, record.offset), (2, 9));
        assert_eq!(record.timestamp, Some(1_700_000_000_000));
        assert_eq!(record.headers.get_all("ce_id").count(), 2);
        assert_eq!(record.headers.last("tracestate").unwrap().len(), 0);
        assert_eq!(record.value.as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_flush_leaves_executor_free() {
        // Nothing listens on port 1, so the queued record waits out its timeout
        let mut settings = ClientSettings::new("127.0.0.1:1").acks("1");
        settings.message_timeout_ms = 1_000;
        let client = KafkaClient::new(&settings).unwrap();
        let _pending = client
            .producer
            .send_result(FutureRecord::<str, str>::to("binary.t").payload("{}"))
            .map_err(|(e, _)| e)
            .unwrap();

        let start = std::time::Instant::now();
        let (flushed_at, ticked_at) = tokio::join!(
            async {
                let _ = client.flush().await;
                start.elapsed()
            },
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                start.elapsed()
            }
        );
        assert!(ticked_at < flushed_at, "tick {:?} flush {:?}", ticked_at, flushed_at);
    }
}

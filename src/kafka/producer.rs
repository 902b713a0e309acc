//! CloudEvents producer facade
//!
//! [`Producer`] is the narrow seam to a Kafka client: it takes a finished
//! record and resolves once the client reports delivery. The codec never
//! talks to a broker itself.
//!
//! [`CloudEventsProducer`] borrows a client and pairs it with a
//! [`Marshaller`]. It never owns the client, so closing the client (on every
//! exit path) stays with the caller that created it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::{CloudEventError, Result};
use super::messages::{ProducerRecord, RecordMetadata};
use crate::event::CloudEvent;
use crate::marshaller::{EventRoute, Marshaller};

/// Transport client able to deliver Kafka records
#[async_trait]
pub trait Producer: Send + Sync {
    /// Deliver one record, resolving with the assigned partition and offset
    async fn send(&self, record: ProducerRecord) -> Result<RecordMetadata>;

    /// Wait for in-flight records to be delivered
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Sends CloudEvents through a borrowed transport client
pub struct CloudEventsProducer<'a, P, T> {
    client: &'a P,
    marshaller: Arc<Marshaller<T>>,
}

impl<'a, P, T> std::fmt::Debug for CloudEventsProducer<'a, P, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudEventsProducer")
            .field("marshaller", &self.marshaller)
            .finish_non_exhaustive()
    }
}

impl<'a, P, T> CloudEventsProducer<'a, P, T>
where
    P: Producer,
{
    pub fn new(marshaller: impl Into<Arc<Marshaller<T>>>, client: &'a P) -> Self {
        CloudEventsProducer {
            client,
            marshaller: marshaller.into(),
        }
    }

    pub fn builder() -> CloudEventsProducerBuilder<'a, P, T> {
        CloudEventsProducerBuilder::default()
    }

    pub fn marshaller(&self) -> &Marshaller<T> {
        &self.marshaller
    }

    pub fn client(&self) -> &'a P {
        self.client
    }

    /// Encode `event` and send it to `topic`
    pub async fn send(&self, topic: &str, event: &CloudEvent<T>) -> Result<RecordMetadata> {
        self.send_with(event, EventRoute::to(topic)).await
    }

    /// Encode `event` with explicit routing and send it
    ///
    /// Encoding errors are returned before anything reaches the client.
    pub async fn send_with(&self, event: &CloudEvent<T>, route: EventRoute) -> Result<RecordMetadata> {
        let record = self.marshaller.encode_with(event, route)?;
        let topic = record.topic.clone();

        match self.client.send(record).await {
            Ok(metadata) => {
                debug!(
                    event_id = %event.id(),
                    topic = %metadata.topic,
                    partition = metadata.partition,
                    offset = metadata.offset,
                    "Delivered CloudEvent"
                );
                Ok(metadata)
            }
            Err(e) => {
                warn!(event_id = %event.id(), topic = %topic, error = %e, "CloudEvent delivery failed");
                Err(e)
            }
        }
    }

    pub async fn flush(&self) -> Result<()> {
        self.client.flush().await
    }
}

/// Builder for [`CloudEventsProducer`] that checks both collaborators are set
pub struct CloudEventsProducerBuilder<'a, P, T> {
    client: Option<&'a P>,
    marshaller: Option<Arc<Marshaller<T>>>,
}

impl<'a, P, T> Default for CloudEventsProducerBuilder<'a, P, T> {
    fn default() -> Self {
        CloudEventsProducerBuilder {
            client: None,
            marshaller: None,
        }
    }
}

impl<'a, P, T> CloudEventsProducerBuilder<'a, P, T>
where
    P: Producer,
{
    pub fn client(mut self, client: &'a P) -> Self {
        self.client = Some(client);
        self
    }

    /// Accept an optional client, e.g. one looked up at runtime
    pub fn client_opt(mut self, client: Option<&'a P>) -> Self {
        self.client = client;
        self
    }

    pub fn marshaller(mut self, marshaller: impl Into<Arc<Marshaller<T>>>) -> Self {
        self.marshaller = Some(marshaller.into());
        self
    }

    /// # Errors
    ///
    /// `Configuration` when the client or the marshaller is missing. The
    /// check happens here, never lazily on the first send.
    pub fn build(self) -> Result<CloudEventsProducer<'a, P, T>> {
        let client = self.client.ok_or_else(|| {
            CloudEventError::Configuration("transport client is required".to_string())
        })?;
        let marshaller = self.marshaller.ok_or_else(|| {
            CloudEventError::Configuration("marshaller is required".to_string())
        })?;
        Ok(CloudEventsProducer { client, marshaller })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::mock::MockProducer;
    use crate::testing::{much_event, Much, RejectingProducer};

    fn marshaller() -> Marshaller<Much> {
        Marshaller::builder().json().build().unwrap()
    }

    #[test]
    fn test_build_without_client_fails() {
        let err = CloudEventsProducer::<MockProducer, Much>::builder()
            .client_opt(None)
            .marshaller(marshaller())
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("transport client"));
    }

    #[test]
    fn test_build_without_marshaller_fails() {
        let mock = MockProducer::new();
        let err = CloudEventsProducer::<MockProducer, Much>::builder()
            .client(&mock)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("marshaller"));
    }

    #[tokio::test]
    async fn test_send_records_history() {
        let mock = MockProducer::new();
        let producer = CloudEventsProducer::new(marshaller(), &mock);
        let event = much_event().build().unwrap();

        let metadata = producer.send("binary.t", &event).await.unwrap();
        assert_eq!(metadata.topic, "binary.t");
        assert_eq!(metadata.offset, 0);

        let history = mock.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].headers.last("ce_id").unwrap().as_ref(), b"x10");
    }

    #[tokio::test]
    async fn test_encoding_error_never_reaches_client() {
        let failing = Marshaller::<Much>::builder()
            .serializer(|_: &Much| Err("cannot encode".into()))
            .deserializer(crate::marshaller::json_deserializer::<Much>())
            .build()
            .unwrap();
        let mock = MockProducer::new();
        let producer = CloudEventsProducer::new(failing, &mock);
        let event = much_event().build().unwrap();

        let err = producer.send("binary.t", &event).await.unwrap_err();
        assert!(matches!(err, CloudEventError::PayloadEncoding(_)));
        assert!(mock.history().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_error_propagates() {
        let client = RejectingProducer::new("broker unavailable");
        let producer = CloudEventsProducer::new(marshaller(), &client);
        let event = much_event().build().unwrap();

        match producer.send("binary.t", &event).await {
            Err(CloudEventError::Delivery { topic, error }) => {
                assert_eq!(topic, "binary.t");
                assert_eq!(error, "broker unavailable");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(client.attempts(), 1);
    }
}

// Binary content-mode marshaller
//
// Encode path:
//   CloudEvent -> core `ce_*` headers -> extension headers -> payload value
//              -> ProducerRecord (topic, key, partition)
//
// Decode path:
//   ConsumerRecord -> core attributes (strict) -> extension candidates
//                  -> payload -> CloudEvent
//
// A Marshaller is immutable once built. The serializer pair and the set of
// recognized extension kinds are fixed at construction, so every record it
// encodes can be decoded by the same instance.

pub mod attributes;
pub mod payload;
pub mod record;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{Config, KeyStrategy};
use crate::event::CloudEvent;
use crate::extensions::{ensure_unreserved, validate_kinds, Extension, ExtensionKind};
use crate::kafka::constants::is_reserved_header;
use crate::kafka::error::{BoxError, CloudEventError, Result};
use crate::kafka::messages::{ConsumerRecord, Headers, ProducerRecord};

pub use attributes::{format_time, parse_time};
pub use payload::{
    json_deserializer, json_serializer, text_deserializer, text_serializer, DeserializeFn,
    SerializeFn,
};
pub use record::EventRoute;

/// Converts CloudEvents with payload type `T` to and from Kafka records
pub struct Marshaller<T> {
    serializer: Arc<SerializeFn<T>>,
    deserializer: Arc<DeserializeFn<T>>,
    extension_kinds: Vec<ExtensionKind>,
    key_strategy: KeyStrategy,
}

impl<T> Clone for Marshaller<T> {
    fn clone(&self) -> Self {
        Marshaller {
            serializer: Arc::clone(&self.serializer),
            deserializer: Arc::clone(&self.deserializer),
            extension_kinds: self.extension_kinds.clone(),
            key_strategy: self.key_strategy,
        }
    }
}

impl<T> fmt::Debug for Marshaller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marshaller")
            .field("extension_kinds", &self.extension_kinds)
            .field("key_strategy", &self.key_strategy)
            .finish_non_exhaustive()
    }
}

impl<T> Marshaller<T> {
    pub fn builder() -> MarshallerBuilder<T> {
        MarshallerBuilder::new()
    }

    pub fn extension_kinds(&self) -> &[ExtensionKind] {
        &self.extension_kinds
    }

    pub fn key_strategy(&self) -> KeyStrategy {
        self.key_strategy
    }

    /// Encode an event for `topic`
    pub fn encode(&self, event: &CloudEvent<T>, topic: &str) -> Result<ProducerRecord> {
        self.encode_with(event, EventRoute::to(topic))
    }

    /// Encode an event with explicit routing (topic, key, partition)
    ///
    /// # Errors
    ///
    /// - `Validation` if a required attribute is empty
    /// - `Configuration` if an extension writes a reserved header
    /// - `PayloadEncoding` if the serializer fails
    pub fn encode_with(&self, event: &CloudEvent<T>, route: EventRoute) -> Result<ProducerRecord> {
        let headers = self.encode_headers(event)?;
        let value = payload::encode_payload(&*self.serializer, event.data())?;
        let derived_key = record::derive_key(self.key_strategy, event);

        debug!(
            event_id = %event.id(),
            topic = %route.topic,
            headers = headers.len(),
            has_value = value.is_some(),
            "Encoded CloudEvent"
        );

        Ok(record::assemble(route, derived_key, headers, value))
    }

    /// Project core attributes and extensions into record headers
    pub fn encode_headers(&self, event: &CloudEvent<T>) -> Result<Headers> {
        let mut headers = Headers::new();
        attributes::project_attributes(event, &mut headers)?;
        project_extensions(event.extensions(), &mut headers)?;
        Ok(headers)
    }

    /// Decode a received record
    pub fn decode(&self, record: &ConsumerRecord) -> Result<CloudEvent<T>> {
        trace!(
            topic = %record.topic,
            partition = record.partition,
            offset = record.offset,
            "Decoding CloudEvent"
        );
        self.decode_parts(&record.headers, record.value.as_deref())
    }

    /// Decode an event from raw headers and value
    ///
    /// # Errors
    ///
    /// - `MalformedEvent` if a core header is missing, repeated or unparsable
    /// - `PayloadDecoding` if the deserializer fails
    pub fn decode_parts(&self, headers: &Headers, value: Option<&[u8]>) -> Result<CloudEvent<T>> {
        let core = attributes::parse_attributes(headers)?;

        let candidates: Headers = headers
            .iter()
            .filter(|h| !is_reserved_header(&h.key))
            .cloned()
            .collect();

        let mut extensions: Vec<Extension> = self
            .extension_kinds
            .iter()
            .filter_map(|kind| kind.parse(&candidates))
            .collect();
        // Extension headers are written in event order
        extensions.sort_by_key(|ext| first_header_position(&candidates, ext));

        if extensions.is_empty() && !candidates.is_empty() {
            trace!(
                candidates = candidates.len(),
                "No registered extension recognized record headers"
            );
        }

        let data = payload::decode_payload(&*self.deserializer, value)?;

        Ok(CloudEvent {
            spec_version: core.spec_version,
            id: core.id,
            source: core.source,
            event_type: core.event_type,
            data_content_type: core.data_content_type,
            schema: core.schema,
            subject: core.subject,
            time: core.time,
            data,
            extensions,
        })
    }
}

fn first_header_position(headers: &Headers, extension: &Extension) -> usize {
    let names = extension.header_names();
    headers
        .iter()
        .position(|h| names.contains(&h.key.as_str()))
        .unwrap_or(usize::MAX)
}

/// Merge extension headers after the core attributes, in order
///
/// A later extension overwrites an earlier one on the same name. Reserved
/// names are rejected here as well as at registration.
fn project_extensions(extensions: &[Extension], headers: &mut Headers) -> Result<()> {
    for extension in extensions {
        let pairs = extension.to_headers();
        ensure_unreserved(extension.name(), pairs.iter().map(|(k, _)| k.as_str()))?;
        for (name, value) in pairs {
            headers.insert(name, value);
        }
    }
    Ok(())
}

/// Builder for [`Marshaller`]
pub struct MarshallerBuilder<T> {
    serializer: Option<Arc<SerializeFn<T>>>,
    deserializer: Option<Arc<DeserializeFn<T>>>,
    extension_kinds: Vec<ExtensionKind>,
    key_strategy: KeyStrategy,
}

impl<T> Default for MarshallerBuilder<T> {
    fn default() -> Self {
        MarshallerBuilder {
            serializer: None,
            deserializer: None,
            extension_kinds: Vec::new(),
            key_strategy: KeyStrategy::default(),
        }
    }
}

impl<T> MarshallerBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serializer<F>(mut self, serializer: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        let serializer: Arc<SerializeFn<T>> = Arc::new(serializer);
        self.serializer = Some(serializer);
        self
    }

    pub fn deserializer<F>(mut self, deserializer: F) -> Self
    where
        F: Fn(&[u8]) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        let deserializer: Arc<DeserializeFn<T>> = Arc::new(deserializer);
        self.deserializer = Some(deserializer);
        self
    }

    /// Register an extension kind recognized when decoding
    pub fn extension(mut self, kind: ExtensionKind) -> Self {
        self.extension_kinds.push(kind);
        self
    }

    pub fn key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Apply the marshaller-relevant parts of a [`Config`]
    pub fn config(self, config: &Config) -> Self {
        self.key_strategy(config.key_strategy)
    }

    /// # Errors
    ///
    /// `Configuration` if the serializer or deserializer is missing, or if the
    /// registered extension kinds claim reserved or overlapping headers.
    pub fn build(self) -> Result<Marshaller<T>> {
        let serializer = self.serializer.ok_or_else(|| {
            CloudEventError::Configuration("payload serializer is not configured".to_string())
        })?;
        let deserializer = self.deserializer.ok_or_else(|| {
            CloudEventError::Configuration("payload deserializer is not configured".to_string())
        })?;
        validate_kinds(&self.extension_kinds)?;

        Ok(Marshaller {
            serializer,
            deserializer,
            extension_kinds: self.extension_kinds,
            key_strategy: self.key_strategy,
        })
    }
}

impl<T> MarshallerBuilder<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Use serde_json for the payload in both directions
    pub fn json(self) -> Self {
        self.serializer(json_serializer::<T>())
            .deserializer(json_deserializer::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{CustomExtension, DistributedTracing};
    use crate::testing::{consumed, much_event, Much};
    use bytes::Bytes;

    fn marshaller() -> Marshaller<Much> {
        Marshaller::builder()
            .json()
            .extension(ExtensionKind::DistributedTracing)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_serializer_pair() {
        let err = Marshaller::<Much>::builder()
            .deserializer(json_deserializer::<Much>())
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("serializer"));

        let err = Marshaller::<Much>::builder()
            .serializer(json_serializer::<Much>())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("deserializer"));
    }

    #[test]
    fn test_build_rejects_reserved_extension_kind() {
        let err = Marshaller::<Much>::builder()
            .json()
            .extension(ExtensionKind::custom("bad", ["ce_type"]))
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let m = marshaller();
        let event = much_event()
            .extension(DistributedTracing::new("0").with_tracestate("congo=4"))
            .build()
            .unwrap();

        let record = m.encode(&event, "binary.t").unwrap();
        let decoded = m.decode(&consumed(record)).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_later_extension_wins() {
        let event = much_event()
            .extension(CustomExtension::new("a").with_attribute("shared", "first"))
            .extension(CustomExtension::new("b").with_attribute("shared", "second"))
            .build()
            .unwrap();

        let headers = marshaller().encode_headers(&event).unwrap();
        assert_eq!(headers.get_all("shared").count(), 1);
        assert_eq!(headers.last("shared").unwrap().as_ref(), b"second");
    }

    #[test]
    fn test_unregistered_extension_headers_ignored_on_decode() {
        let m = marshaller();
        let event = much_event()
            .extension(CustomExtension::new("sequence").with_attribute("sequence", "1"))
            .build()
            .unwrap();

        let record = m.encode(&event, "t").unwrap();
        assert!(record.headers.contains("sequence"));

        let decoded = m.decode(&consumed(record)).unwrap();
        assert!(decoded.extensions().is_empty());
        assert_eq!(decoded.id(), event.id());
    }

    #[test]
    fn test_extension_order_survives_round_trip() {
        // Registered tracing first, attached to the event last
        let m = Marshaller::<Much>::builder()
            .json()
            .extension(ExtensionKind::DistributedTracing)
            .extension(ExtensionKind::custom("sequence", ["sequence"]))
            .build()
            .unwrap();
        let event = much_event()
            .extension(CustomExtension::new("sequence").with_attribute("sequence", "1"))
            .extension(DistributedTracing::new("0"))
            .build()
            .unwrap();

        let decoded = m.decode(&consumed(m.encode(&event, "t").unwrap())).unwrap();
        let names: Vec<&str> = decoded.extensions().iter().map(Extension::name).collect();
        assert_eq!(names, ["sequence", "distributedtracing"]);
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_key_strategy_applied() {
        let m = Marshaller::<Much>::builder()
            .json()
            .key_strategy(KeyStrategy::Id)
            .build()
            .unwrap();
        let event = much_event().build().unwrap();

        let record = m.encode(&event, "t").unwrap();
        assert_eq!(record.key, Some(Bytes::from_static(b"x10")));

        let record = m
            .encode_with(&event, EventRoute::to("t").key("given").partition(1))
            .unwrap();
        assert_eq!(record.key, Some(Bytes::from_static(b"given")));
        assert_eq!(record.partition, Some(1));
    }

    #[test]
    fn test_marshaller_is_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Marshaller<Much>>();
    }
}

//! Record assembly
//!
//! Combines projected headers and the serialized value with caller-supplied
//! routing into one outbound record. Nothing here validates or fails.

use bytes::Bytes;

use crate::config::KeyStrategy;
use crate::event::CloudEvent;
use crate::kafka::messages::{Headers, ProducerRecord};

/// Where an encoded event goes: topic plus optional key and partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRoute {
    pub topic: String,
    pub key: Option<Bytes>,
    pub partition: Option<i32>,
}

impl EventRoute {
    pub fn to(topic: impl Into<String>) -> Self {
        EventRoute {
            topic: topic.into(),
            key: None,
            partition: None,
        }
    }

    pub fn key(mut self, key: impl Into<Bytes>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn partition(mut self, partition: i32) -> Self {
        self.partition = Some(partition);
        self
    }
}

impl From<&str> for EventRoute {
    fn from(topic: &str) -> Self {
        EventRoute::to(topic)
    }
}

impl From<String> for EventRoute {
    fn from(topic: String) -> Self {
        EventRoute::to(topic)
    }
}

/// Record key derived from the event when the route carries none
pub(crate) fn derive_key<T>(strategy: KeyStrategy, event: &CloudEvent<T>) -> Option<Bytes> {
    match strategy {
        KeyStrategy::None => None,
        KeyStrategy::Id => Some(Bytes::copy_from_slice(event.id().as_bytes())),
        KeyStrategy::Subject => event
            .subject()
            .map(|s| Bytes::copy_from_slice(s.as_bytes())),
    }
}

pub(crate) fn assemble(
    route: EventRoute,
    derived_key: Option<Bytes>,
    headers: Headers,
    value: Option<Bytes>,
) -> ProducerRecord {
    ProducerRecord {
        topic: route.topic,
        partition: route.partition,
        key: route.key.or(derived_key),
        headers,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(subject: Option<&str>) -> CloudEvent<()> {
        let mut builder = CloudEvent::builder()
            .id("x10")
            .source("/source")
            .event_type("event-type");
        if let Some(s) = subject {
            builder = builder.subject(s);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_route_builder() {
        let route = EventRoute::to("binary.t").key("k").partition(3);
        assert_eq!(route.topic, "binary.t");
        assert_eq!(route.key, Some(Bytes::from_static(b"k")));
        assert_eq!(route.partition, Some(3));

        let plain: EventRoute = "binary.t".into();
        assert!(plain.key.is_none());
        assert!(plain.partition.is_none());
    }

    #[test]
    fn test_derive_key() {
        let with_subject = event(Some("orders/42"));
        let without_subject = event(None);

        assert_eq!(derive_key(KeyStrategy::None, &with_subject), None);
        assert_eq!(
            derive_key(KeyStrategy::Id, &with_subject),
            Some(Bytes::from_static(b"x10"))
        );
        assert_eq!(
            derive_key(KeyStrategy::Subject, &with_subject),
            Some(Bytes::from_static(b"orders/42"))
        );
        assert_eq!(derive_key(KeyStrategy::Subject, &without_subject), None);
    }

    #[test]
    fn test_explicit_key_wins_over_derived() {
        let record = assemble(
            EventRoute::to("t").key("explicit"),
            Some(Bytes::from_static(b"derived")),
            Headers::new(),
            None,
        );
        assert_eq!(record.key, Some(Bytes::from_static(b"explicit")));

        let record = assemble(
            EventRoute::to("t"),
            Some(Bytes::from_static(b"derived")),
            Headers::new(),
            Some(Bytes::from_static(b"{}")),
        );
        assert_eq!(record.key, Some(Bytes::from_static(b"derived")));
        assert_eq!(record.value, Some(Bytes::from_static(b"{}")));
    }
}

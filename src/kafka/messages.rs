// Kafka record types exchanged with the transport client
//
// The codec never talks to a broker. It produces `ProducerRecord`s that a
// `Producer` delivers, and it consumes `ConsumerRecord`s handed over by a
// consumer (or parsed from a RecordBatch).

use bytes::Bytes;

/// Record header (key-value metadata)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// Header key (UTF-8 string, case-sensitive)
    pub key: String,
    /// Header value (binary data)
    pub value: Bytes,
}

impl RecordHeader {
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        RecordHeader {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered set of record headers
///
/// Kafka allows the same key to appear more than once on the wire, so the
/// set keeps every header it is given through [`Headers::append`]. Headers
/// written by the marshaller go through [`Headers::insert`], which replaces
/// an existing entry so a name maps to one effective value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<RecordHeader>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing every previous value (last write wins)
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        let key = key.into();
        self.entries.retain(|h| h.key != key);
        self.entries.push(RecordHeader::new(key, value));
    }

    /// Add a header without touching existing entries of the same name
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.entries.push(RecordHeader::new(key, value));
    }

    /// Value of the last header named `key`
    pub fn last(&self, key: &str) -> Option<&Bytes> {
        self.entries
            .iter()
            .rev()
            .find(|h| h.key == key)
            .map(|h| &h.value)
    }

    /// Every value stored under `key`, in insertion order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Bytes> + 'a {
        self.entries
            .iter()
            .filter(move |h| h.key == key)
            .map(|h| &h.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|h| h.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordHeader> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RecordHeader> for Headers {
    fn from_iter<I: IntoIterator<Item = RecordHeader>>(iter: I) -> Self {
        Headers {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Headers {
    type Item = RecordHeader;
    type IntoIter = std::vec::IntoIter<RecordHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Outbound record handed to a transport client
///
/// Built fresh for every send and never reused after the handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerRecord {
    /// Target topic
    pub topic: String,
    /// Explicit partition (None lets the client pick one)
    pub partition: Option<i32>,
    /// Optional message key (used for partitioning and log compaction)
    pub key: Option<Bytes>,
    /// Message headers
    pub headers: Headers,
    /// Serialized payload; None when the event carries no data
    pub value: Option<Bytes>,
}

/// Record received from a topic partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Timestamp (milliseconds since epoch, optional)
    pub timestamp: Option<i64>,
    pub key: Option<Bytes>,
    pub headers: Headers,
    pub value: Option<Bytes>,
}

impl ConsumerRecord {
    /// View a delivered producer record the way a consumer would receive it
    pub fn from_delivered(record: ProducerRecord, metadata: &RecordMetadata) -> Self {
        ConsumerRecord {
            topic: record.topic,
            partition: metadata.partition,
            offset: metadata.offset,
            timestamp: metadata.timestamp,
            key: record.key,
            headers: record.headers,
            value: record.value,
        }
    }
}

/// Delivery acknowledgement returned by a transport client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub timestamp: Option<i64>,
}

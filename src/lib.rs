//! CloudEvents binary content mode for Kafka
//!
//! Maps a [`CloudEvent`] to a Kafka record and back: attributes travel as
//! `ce_*` headers, extensions as their own headers, and the payload as the
//! record value produced by an injected serializer.
//!
//! ```ignore
//! let marshaller = Marshaller::<Order>::builder().json().build()?;
//! let record = marshaller.encode(&event, "orders")?;
//! let back = marshaller.decode(&received)?;
//! ```

pub mod config; // Configuration (key strategy, timeouts, env lookup)
pub mod event; // CloudEvent model and builder
pub mod extensions; // Extension values and decode-time recognition
pub mod kafka; // Record types, producer seam, wire codec
pub mod marshaller; // Binary content-mode codec

// Test utilities (only compiled in test builds)
#[cfg(test)]
mod testing;

pub use config::{Config, KeyStrategy};
pub use event::{CloudEvent, CloudEventBuilder, SpecVersion, UriRef};
pub use extensions::{CustomExtension, DistributedTracing, Extension, ExtensionKind};
pub use kafka::{
    CloudEventError, CloudEventsProducer, ConsumerRecord, Headers, MockProducer, Producer,
    ProducerRecord, RecordMetadata, Result,
};
pub use marshaller::{EventRoute, Marshaller, MarshallerBuilder};

//! CloudEvents Kafka binding constants
//!
//! This module centralizes the header names used by the binary content mode
//! together with the defaults and bounds of the crate configuration.
//!
//! # Terminology
//! - **Binary content mode**: event attributes travel in record headers, the
//!   payload travels verbatim in the record value
//! - **Reserved header**: a header name owned by a core attribute

// ===== Header Naming =====

/// Prefix shared by every core attribute header
///
/// The whole `ce_` namespace is reserved; extensions may not emit names in it.
pub const HEADER_PREFIX: &str = "ce_";

/// Header carrying the CloudEvents spec version
pub const HEADER_SPECVERSION: &str = "ce_specversion";

/// Header carrying the event id
pub const HEADER_ID: &str = "ce_id";

/// Header carrying the event source URI reference
pub const HEADER_SOURCE: &str = "ce_source";

/// Header carrying the event type
pub const HEADER_TYPE: &str = "ce_type";

/// Header carrying the optional subject
pub const HEADER_SUBJECT: &str = "ce_subject";

/// Header carrying the optional schema reference (spec 0.3)
pub const HEADER_SCHEMAURL: &str = "ce_schemaurl";

/// Header carrying the optional schema reference (spec 1.0)
pub const HEADER_DATASCHEMA: &str = "ce_dataschema";

/// Header carrying the optional event time
pub const HEADER_TIME: &str = "ce_time";

/// Header carrying the optional content type of the payload
pub const HEADER_DATACONTENTTYPE: &str = "ce_datacontenttype";

/// Every header name a core attribute can occupy, across spec versions
pub const CORE_HEADERS: [&str; 9] = [
    HEADER_SPECVERSION,
    HEADER_ID,
    HEADER_SOURCE,
    HEADER_TYPE,
    HEADER_SUBJECT,
    HEADER_SCHEMAURL,
    HEADER_DATASCHEMA,
    HEADER_TIME,
    HEADER_DATACONTENTTYPE,
];

// ===== Distributed Tracing Extension =====

/// W3C trace context parent header
pub const HEADER_TRACEPARENT: &str = "traceparent";

/// W3C trace context vendor state header
pub const HEADER_TRACESTATE: &str = "tracestate";

/// Extension name of the distributed tracing extension
pub const DISTRIBUTED_TRACING_EXTENSION: &str = "distributedtracing";

// ===== Configuration Defaults =====

/// Default time a transport client may spend delivering one record
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 30_000;

/// Lower bound for the delivery timeout
pub const MIN_DELIVERY_TIMEOUT_MS: u64 = 100;

/// Upper bound for the delivery timeout (5 minutes)
pub const MAX_DELIVERY_TIMEOUT_MS: u64 = 300_000;

/// Default partition count per topic for the in-memory mock client
pub const DEFAULT_MOCK_PARTITIONS: i32 = 1;

/// Lower bound for the mock partition count
pub const MIN_MOCK_PARTITIONS: i32 = 1;

/// Upper bound for the mock partition count
pub const MAX_MOCK_PARTITIONS: i32 = 1024;

// ===== Environment Variables =====

/// Environment variable selecting the record key strategy
pub const ENV_KEY_STRATEGY: &str = "CE_KAFKA_KEY_STRATEGY";

/// Environment variable overriding the delivery timeout
pub const ENV_DELIVERY_TIMEOUT_MS: &str = "CE_KAFKA_DELIVERY_TIMEOUT_MS";

/// Environment variable overriding the mock partition count
pub const ENV_MOCK_PARTITIONS: &str = "CE_KAFKA_MOCK_PARTITIONS";

/// Whether a header name belongs to the reserved core attribute namespace
pub fn is_reserved_header(name: &str) -> bool {
    name.starts_with(HEADER_PREFIX)
}

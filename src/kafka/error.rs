//! CloudEvents marshalling error types
//!
//! Every failure of the codec and of the producer facade is reported through
//! [`CloudEventError`]. Errors are returned to the caller of encode, decode or
//! send; nothing here is retried or swallowed.

use thiserror::Error;

/// Boxed error produced by injected payload serializers and transport clients
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while marshalling CloudEvents to and from Kafka records
#[derive(Error, Debug)]
pub enum CloudEventError {
    /// The event violates a required-attribute invariant
    #[error("Invalid event: {0}")]
    Validation(String),

    /// Conflicting extension registration or incomplete marshaller/producer setup
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The injected payload serializer failed
    #[error("Payload encoding failed: {0}")]
    PayloadEncoding(#[source] BoxError),

    /// The injected payload deserializer failed
    #[error("Payload decoding failed: {0}")]
    PayloadDecoding(#[source] BoxError),

    /// A received record does not carry a well-formed CloudEvent
    #[error("Malformed event header {header}: {reason}")]
    MalformedEvent { header: String, reason: String },

    /// The transport client could not deliver a record
    #[error("Failed to deliver record to {topic}: {error}")]
    Delivery { topic: String, error: String },

    /// Error encoding or decoding the record batch wire format
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Error from kafka-protocol crate (anyhow::Error)
    #[error("Protocol encoding/decoding error: {0}")]
    ProtocolCodec(#[from] anyhow::Error),
}

impl CloudEventError {
    /// Shorthand for a decode-time failure on a specific header
    pub fn malformed(header: impl Into<String>, reason: impl Into<String>) -> Self {
        CloudEventError::MalformedEvent {
            header: header.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error was raised while building a marshaller or producer
    ///
    /// Configuration errors are fatal: the same inputs will fail again.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, CloudEventError::Configuration(_))
    }
}

/// Result type alias for CloudEvents marshalling operations
pub type Result<T> = std::result::Result<T, CloudEventError>;

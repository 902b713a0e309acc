//! CloudEvent model
//!
//! A [`CloudEvent`] is an immutable value: it is produced once by
//! [`CloudEventBuilder::build`], which enforces the required attributes, and is
//! only read afterwards. The payload type `T` is opaque to the envelope; it is
//! turned into bytes by the serializer configured on the marshaller.

pub mod builder;
pub mod uri;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::extensions::Extension;
use crate::kafka::constants::{HEADER_DATASCHEMA, HEADER_SCHEMAURL};
use crate::kafka::error::{CloudEventError, Result};

pub use builder::CloudEventBuilder;
pub use uri::UriRef;

/// CloudEvents specification revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecVersion {
    #[default]
    V03,
    V10,
}

impl SpecVersion {
    /// Parse the `specversion` literal
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "0.3" => Ok(SpecVersion::V03),
            "1.0" => Ok(SpecVersion::V10),
            other => Err(CloudEventError::Validation(format!(
                "unsupported specversion {:?}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::V03 => "0.3",
            SpecVersion::V10 => "1.0",
        }
    }

    /// Header carrying the schema reference in this revision
    ///
    /// 0.3 calls the attribute `schemaurl`, 1.0 renamed it to `dataschema`.
    pub fn schema_header(&self) -> &'static str {
        match self {
            SpecVersion::V03 => HEADER_SCHEMAURL,
            SpecVersion::V10 => HEADER_DATASCHEMA,
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event envelope with an optional payload of type `T`
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEvent<T> {
    pub(crate) spec_version: SpecVersion,
    pub(crate) id: String,
    pub(crate) source: UriRef,
    pub(crate) event_type: String,
    pub(crate) data_content_type: Option<String>,
    pub(crate) schema: Option<UriRef>,
    pub(crate) subject: Option<String>,
    pub(crate) time: Option<DateTime<Utc>>,
    pub(crate) data: Option<T>,
    pub(crate) extensions: Vec<Extension>,
}

impl<T> CloudEvent<T> {
    pub fn builder() -> CloudEventBuilder<T> {
        CloudEventBuilder::new()
    }

    pub fn spec_version(&self) -> SpecVersion {
        self.spec_version
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &UriRef {
        &self.source
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn data_content_type(&self) -> Option<&str> {
        self.data_content_type.as_deref()
    }

    /// `schemaurl` (0.3) or `dataschema` (1.0)
    pub fn schema(&self) -> Option<&UriRef> {
        self.schema.as_ref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn time(&self) -> Option<&DateTime<Utc>> {
        self.time.as_ref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// First extension with the given name
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.name() == name)
    }

    /// Consume the event, keeping only its payload
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

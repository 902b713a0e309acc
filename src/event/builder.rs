//! Validated construction of CloudEvents
//!
//! The builder collects attributes and checks them all in [`CloudEventBuilder::build`].
//! A built event is never corrected afterwards; invalid input is an error.

use chrono::{DateTime, Datelike, Utc};

use super::{CloudEvent, SpecVersion, UriRef};
use crate::extensions::{ensure_unreserved, Extension};
use crate::kafka::error::{CloudEventError, Result};

/// Builder for [`CloudEvent`]
#[derive(Debug, Clone)]
pub struct CloudEventBuilder<T> {
    spec_version: SpecVersion,
    id: Option<String>,
    source: Option<String>,
    event_type: Option<String>,
    data_content_type: Option<String>,
    schema: Option<String>,
    subject: Option<String>,
    time: Option<DateTime<Utc>>,
    data: Option<T>,
    extensions: Vec<Extension>,
}

impl<T> Default for CloudEventBuilder<T> {
    fn default() -> Self {
        CloudEventBuilder {
            spec_version: SpecVersion::default(),
            id: None,
            source: None,
            event_type: None,
            data_content_type: None,
            schema: None,
            subject: None,
            time: None,
            data: None,
            extensions: Vec::new(),
        }
    }
}

impl<T> CloudEventBuilder<T> {
    /// New builder for the default spec revision (0.3)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spec_version(mut self, version: SpecVersion) -> Self {
        self.spec_version = version;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn data_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.data_content_type = Some(content_type.into());
        self
    }

    /// Schema reference, written as `schemaurl` (0.3) or `dataschema` (1.0)
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach an extension; extensions are projected in the order added
    pub fn extension(mut self, extension: impl Into<Extension>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    /// Validate every attribute and produce the immutable event
    ///
    /// # Errors
    ///
    /// - `Validation` if `id`, `source` or `type` is missing or empty, if an
    ///   optional string attribute is set to an empty string, if a URI
    ///   reference does not parse, or if `time` falls outside years 0000-9999
    /// - `Configuration` if an extension claims a reserved `ce_*` header or
    ///   carries no attributes at all
    pub fn build(self) -> Result<CloudEvent<T>> {
        let id = required("id", self.id)?;
        let event_type = required("type", self.event_type)?;
        let source = UriRef::try_from(required("source", self.source)?)?;
        let schema = self.schema.map(UriRef::try_from).transpose()?;
        let subject = optional("subject", self.subject)?;
        let data_content_type = optional("datacontenttype", self.data_content_type)?;

        if let Some(time) = &self.time {
            check_time(time)?;
        }

        for extension in &self.extensions {
            let names = extension.header_names();
            if names.is_empty() {
                return Err(CloudEventError::Configuration(format!(
                    "extension {} carries no attributes",
                    extension.name()
                )));
            }
            ensure_unreserved(extension.name(), names)?;
        }

        Ok(CloudEvent {
            spec_version: self.spec_version,
            id,
            source,
            event_type,
            data_content_type,
            schema,
            subject,
            time: self.time,
            data: self.data,
            extensions: self.extensions,
        })
    }
}

fn required(attribute: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(CloudEventError::Validation(format!(
            "{} must not be empty",
            attribute
        ))),
        None => Err(CloudEventError::Validation(format!(
            "{} is required",
            attribute
        ))),
    }
}

/// RFC 3339 only has room for four-digit years
fn check_time(time: &DateTime<Utc>) -> Result<()> {
    if (0..=9999).contains(&time.year()) {
        Ok(())
    } else {
        Err(CloudEventError::Validation(format!(
            "time {} is outside the RFC 3339 year range",
            time
        )))
    }
}

fn optional(attribute: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(v) if v.is_empty() => Err(CloudEventError::Validation(format!(
            "{} must be absent rather than empty",
            attribute
        ))),
        other => Ok(other),
    }
}

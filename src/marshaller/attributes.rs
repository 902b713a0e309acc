//! Core attribute projection
//!
//! Encoding writes one `ce_<attribute>` header per present attribute. Decoding
//! reads the same headers back and refuses records whose required headers are
//! missing, repeated or unparsable.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::event::{CloudEvent, SpecVersion, UriRef};
use crate::kafka::constants::{
    is_reserved_header, HEADER_DATACONTENTTYPE, HEADER_ID, HEADER_SOURCE, HEADER_SPECVERSION,
    HEADER_SUBJECT, HEADER_TIME, HEADER_TYPE,
};
use crate::kafka::error::{CloudEventError, Result};
use crate::kafka::messages::Headers;

/// Core attributes read back from a record
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CoreAttributes {
    pub spec_version: SpecVersion,
    pub id: String,
    pub source: UriRef,
    pub event_type: String,
    pub data_content_type: Option<String>,
    pub schema: Option<UriRef>,
    pub subject: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

/// Canonical text form of an event time (RFC 3339, UTC, `Z` suffix)
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CloudEventError::malformed(HEADER_TIME, format!("invalid timestamp: {}", e)))
}

/// Write the core attribute headers of `event` into `headers`
pub(crate) fn project_attributes<T>(event: &CloudEvent<T>, headers: &mut Headers) -> Result<()> {
    // Unreachable for builder-made events, but never emit an empty required header.
    for (attribute, value) in [
        ("id", event.id()),
        ("source", event.source().as_str()),
        ("type", event.event_type()),
    ] {
        if value.is_empty() {
            return Err(CloudEventError::Validation(format!(
                "required attribute {} is empty",
                attribute
            )));
        }
    }

    let version = event.spec_version();
    headers.insert(HEADER_SPECVERSION, version.as_str().to_string());
    headers.insert(HEADER_ID, event.id().to_string());
    headers.insert(HEADER_SOURCE, event.source().to_string());
    headers.insert(HEADER_TYPE, event.event_type().to_string());

    if let Some(subject) = event.subject() {
        headers.insert(HEADER_SUBJECT, subject.to_string());
    }
    if let Some(schema) = event.schema() {
        headers.insert(version.schema_header(), schema.to_string());
    }
    if let Some(time) = event.time() {
        headers.insert(HEADER_TIME, format_time(time));
    }
    if let Some(content_type) = event.data_content_type() {
        headers.insert(HEADER_DATACONTENTTYPE, content_type.to_string());
    }

    Ok(())
}

/// Read the core attributes back from record headers
pub(crate) fn parse_attributes(headers: &Headers) -> Result<CoreAttributes> {
    let spec_version = SpecVersion::parse(&required(headers, HEADER_SPECVERSION)?)
        .map_err(|e| CloudEventError::malformed(HEADER_SPECVERSION, e.to_string()))?;

    let id = required(headers, HEADER_ID)?;
    if id.is_empty() {
        return Err(CloudEventError::malformed(HEADER_ID, "empty id"));
    }

    let event_type = required(headers, HEADER_TYPE)?;
    if event_type.is_empty() {
        return Err(CloudEventError::malformed(HEADER_TYPE, "empty type"));
    }

    let source = parse_uri(HEADER_SOURCE, required(headers, HEADER_SOURCE)?)?;

    let schema_header = spec_version.schema_header();
    let schema = optional(headers, schema_header)?
        .map(|s| parse_uri(schema_header, s))
        .transpose()?;

    let subject = optional(headers, HEADER_SUBJECT)?;
    let data_content_type = optional(headers, HEADER_DATACONTENTTYPE)?;
    let time = optional(headers, HEADER_TIME)?
        .map(|s| parse_time(&s))
        .transpose()?;

    for header in headers.iter() {
        if is_reserved_header(&header.key) && !is_known(&header.key, spec_version) {
            debug!(
                header = %header.key,
                spec_version = %spec_version,
                "Ignoring unknown core attribute header"
            );
        }
    }

    Ok(CoreAttributes {
        spec_version,
        id,
        source,
        event_type,
        data_content_type,
        schema,
        subject,
        time,
    })
}

fn is_known(name: &str, version: SpecVersion) -> bool {
    matches!(
        name,
        HEADER_SPECVERSION
            | HEADER_ID
            | HEADER_SOURCE
            | HEADER_TYPE
            | HEADER_SUBJECT
            | HEADER_TIME
            | HEADER_DATACONTENTTYPE
    ) || name == version.schema_header()
}

fn parse_uri(header: &str, value: String) -> Result<UriRef> {
    UriRef::try_from(value).map_err(|e| CloudEventError::malformed(header, e.to_string()))
}

fn required(headers: &Headers, name: &str) -> Result<String> {
    optional(headers, name)?.ok_or_else(|| CloudEventError::malformed(name, "missing header"))
}

/// A header present once; more than one value is malformed
fn optional(headers: &Headers, name: &str) -> Result<Option<String>> {
    let mut values = headers.get_all(name);
    let first = match values.next() {
        Some(v) => v,
        None => return Ok(None),
    };
    if values.next().is_some() {
        return Err(CloudEventError::malformed(name, "header present more than once"));
    }
    String::from_utf8(first.to_vec())
        .map(Some)
        .map_err(|_| CloudEventError::malformed(name, "value is not valid UTF-8"))
}

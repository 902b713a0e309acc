//! CloudEvent extensions
//!
//! An extension contributes headers next to the core `ce_*` attributes and,
//! on the way back, recognizes its own headers among those a record carries.
//! Extensions are modelled as a closed set of variants so that the
//! reserved-name check lives here, in one place, instead of being left to each
//! extension implementation.
//!
//! - [`Extension`] is the value attached to an event and projected on encode.
//! - [`ExtensionKind`] is registered on a marshaller and drives recognition on
//!   decode.

pub mod distributed_tracing;

use std::collections::BTreeMap;

use bytes::Bytes;
use indexmap::IndexMap;
use tracing::debug;

use crate::kafka::constants::{is_reserved_header, DISTRIBUTED_TRACING_EXTENSION};
use crate::kafka::error::{CloudEventError, Result};
use crate::kafka::messages::Headers;

pub use self::distributed_tracing::DistributedTracing;

/// Free-form extension: each attribute becomes one header of the same name
///
/// Headers are written in attribute insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomExtension {
    pub name: String,
    pub attributes: IndexMap<String, String>,
}

impl CustomExtension {
    pub fn new(name: impl Into<String>) -> Self {
        CustomExtension {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Extension attached to a CloudEvent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
    DistributedTracing(DistributedTracing),
    Custom(CustomExtension),
}

impl Extension {
    pub fn name(&self) -> &str {
        match self {
            Extension::DistributedTracing(_) => DISTRIBUTED_TRACING_EXTENSION,
            Extension::Custom(custom) => &custom.name,
        }
    }

    /// Header names this extension may write
    pub fn header_names(&self) -> Vec<&str> {
        match self {
            Extension::DistributedTracing(_) => DistributedTracing::header_names().to_vec(),
            Extension::Custom(custom) => custom.attributes.keys().map(String::as_str).collect(),
        }
    }

    /// Wire form of the extension as header name/value pairs
    pub fn to_headers(&self) -> Vec<(String, String)> {
        match self {
            Extension::DistributedTracing(dt) => dt.to_headers(),
            Extension::Custom(custom) => custom
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl From<DistributedTracing> for Extension {
    fn from(dt: DistributedTracing) -> Self {
        Extension::DistributedTracing(dt)
    }
}

impl From<CustomExtension> for Extension {
    fn from(custom: CustomExtension) -> Self {
        Extension::Custom(custom)
    }
}

/// Extension format a marshaller knows how to recognize when decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionKind {
    DistributedTracing,
    /// Custom extension owning a fixed set of header names
    Custom { name: String, headers: Vec<String> },
}

impl ExtensionKind {
    pub fn custom<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtensionKind::Custom {
            name: name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ExtensionKind::DistributedTracing => DISTRIBUTED_TRACING_EXTENSION,
            ExtensionKind::Custom { name, .. } => name,
        }
    }

    pub fn header_names(&self) -> Vec<&str> {
        match self {
            ExtensionKind::DistributedTracing => DistributedTracing::header_names().to_vec(),
            ExtensionKind::Custom { headers, .. } => headers.iter().map(String::as_str).collect(),
        }
    }

    /// Recognize and parse this extension from candidate headers
    ///
    /// Returns None when none of the extension's headers are present or a
    /// present value is not UTF-8.
    pub fn parse(&self, candidates: &Headers) -> Option<Extension> {
        match self {
            ExtensionKind::DistributedTracing => {
                DistributedTracing::from_headers(candidates).map(Extension::DistributedTracing)
            }
            ExtensionKind::Custom { name, headers } => {
                let mut attributes = IndexMap::new();
                for header in headers {
                    if let Some(value) = candidates.last(header) {
                        attributes.insert(header.clone(), utf8_value(name, header, value)?);
                    }
                }
                if attributes.is_empty() {
                    None
                } else {
                    Some(Extension::Custom(CustomExtension {
                        name: name.clone(),
                        attributes,
                    }))
                }
            }
        }
    }
}

/// Text value of an extension header
///
/// A value that is not UTF-8 makes the whole extension unrecognized rather
/// than being rewritten.
pub(crate) fn utf8_value(extension: &str, header: &str, value: &Bytes) -> Option<String> {
    match std::str::from_utf8(value) {
        Ok(text) => Some(text.to_string()),
        Err(_) => {
            debug!(
                extension = %extension,
                header = %header,
                "Skipping extension with non-UTF-8 header value"
            );
            None
        }
    }
}

/// Reject header names inside the reserved core attribute namespace
///
/// Every path that lets an extension claim a header name funnels through
/// here: event construction, marshaller registration and projection.
pub fn ensure_unreserved<'a, I>(extension: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in names {
        if name.is_empty() {
            return Err(CloudEventError::Configuration(format!(
                "extension {} uses an empty header name",
                extension
            )));
        }
        if is_reserved_header(name) {
            return Err(CloudEventError::Configuration(format!(
                "extension {} uses reserved header name {}",
                extension, name
            )));
        }
    }
    Ok(())
}

/// Validate a set of extension kinds for registration on one marshaller
///
/// Besides the reserved namespace, two kinds may not claim the same header:
/// decoding would not know which one owns it.
pub(crate) fn validate_kinds(kinds: &[ExtensionKind]) -> Result<()> {
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for kind in kinds {
        let names = kind.header_names();
        if names.is_empty() {
            return Err(CloudEventError::Configuration(format!(
                "extension {} declares no headers",
                kind.name()
            )));
        }
        ensure_unreserved(kind.name(), names.iter().copied())?;
        for name in names {
            if let Some(previous) = owners.insert(name, kind.name()) {
                return Err(CloudEventError::Configuration(format!(
                    "header {} claimed by both {} and {}",
                    name,
                    previous,
                    kind.name()
                )));
            }
        }
    }
    Ok(())
}

//! URI references used by the `source` and schema attributes
//!
//! CloudEvents allows relative references such as `/source`, so this type
//! validates against the RFC 3986 URI-reference grammar instead of requiring
//! an absolute URL. The original text is kept verbatim so it round-trips
//! through a header unchanged.

use std::fmt;
use std::str::FromStr;

use crate::kafka::error::{CloudEventError, Result};

/// A validated RFC 3986 URI reference (absolute URI or relative reference)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UriRef(String);

impl UriRef {
    /// Validate and wrap a URI reference
    pub fn parse(s: &str) -> Result<Self> {
        validate(s).map_err(|reason| {
            CloudEventError::Validation(format!("invalid URI reference {:?}: {}", s, reason))
        })?;
        Ok(UriRef(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference carries a scheme (`https://...`, `urn:...`)
    pub fn is_absolute(&self) -> bool {
        scheme_end(&self.0).is_some()
    }
}

impl fmt::Display for UriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UriRef {
    type Err = CloudEventError;

    fn from_str(s: &str) -> Result<Self> {
        UriRef::parse(s)
    }
}

impl TryFrom<&str> for UriRef {
    type Error = CloudEventError;

    fn try_from(s: &str) -> Result<Self> {
        UriRef::parse(s)
    }
}

impl TryFrom<String> for UriRef {
    type Error = CloudEventError;

    fn try_from(s: String) -> Result<Self> {
        validate(&s).map_err(|reason| {
            CloudEventError::Validation(format!("invalid URI reference {:?}: {}", s, reason))
        })?;
        Ok(UriRef(s))
    }
}

/// Position of the `:` ending a syntactically valid scheme, if any
fn scheme_end(s: &str) -> Option<usize> {
    let colon = s.find(':')?;
    let first_delim = s.find(['/', '?', '#']).unwrap_or(s.len());
    if colon > first_delim {
        return None;
    }
    let scheme = &s[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return None,
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(colon)
    } else {
        None
    }
}

fn validate(s: &str) -> std::result::Result<(), &'static str> {
    if s.is_empty() {
        return Err("empty reference");
    }

    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'%' => {
                let valid = bytes.len() > i + 2
                    && bytes[i + 1].is_ascii_hexdigit()
                    && bytes[i + 2].is_ascii_hexdigit();
                if !valid {
                    return Err("malformed percent-encoding");
                }
                i += 3;
                continue;
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => {}
            b'-' | b'.' | b'_' | b'~' => {}
            b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@' => {}
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {}
            _ => return Err("character not allowed in a URI"),
        }
        i += 1;
    }

    // A colon in the first path segment of a relative reference would be
    // read as a scheme delimiter.
    if s.contains(':') && scheme_end(s).is_none() {
        let first_delim = s.find(['/', '?', '#']).unwrap_or(s.len());
        if s[..first_delim].contains(':') {
            return Err("invalid scheme");
        }
    }

    Ok(())
}

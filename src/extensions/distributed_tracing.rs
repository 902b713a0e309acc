//! Distributed tracing extension
//!
//! Carries W3C trace context alongside the event so consumers can continue
//! the producer's trace. See
//! <https://github.com/cloudevents/spec/blob/v1.0/extensions/distributed-tracing.md>.

use super::utf8_value;
use crate::kafka::constants::{
    DISTRIBUTED_TRACING_EXTENSION, HEADER_TRACEPARENT, HEADER_TRACESTATE,
};
use crate::kafka::messages::Headers;

/// W3C trace context carried by an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributedTracing {
    pub traceparent: String,
    pub tracestate: Option<String>,
}

impl DistributedTracing {
    pub fn new(traceparent: impl Into<String>) -> Self {
        DistributedTracing {
            traceparent: traceparent.into(),
            tracestate: None,
        }
    }

    pub fn with_tracestate(mut self, tracestate: impl Into<String>) -> Self {
        self.tracestate = Some(tracestate.into());
        self
    }

    pub(crate) fn header_names() -> &'static [&'static str] {
        &[HEADER_TRACEPARENT, HEADER_TRACESTATE]
    }

    pub(crate) fn to_headers(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(HEADER_TRACEPARENT.to_string(), self.traceparent.clone())];
        if let Some(state) = &self.tracestate {
            pairs.push((HEADER_TRACESTATE.to_string(), state.clone()));
        }
        pairs
    }

    /// Recognized only when `traceparent` is present; `tracestate` alone
    /// has no meaning without a parent. Non-UTF-8 values are not recognized.
    pub(crate) fn from_headers(headers: &Headers) -> Option<Self> {
        let traceparent = utf8_value(
            DISTRIBUTED_TRACING_EXTENSION,
            HEADER_TRACEPARENT,
            headers.last(HEADER_TRACEPARENT)?,
        )?;
        let tracestate = match headers.last(HEADER_TRACESTATE) {
            Some(v) => Some(utf8_value(DISTRIBUTED_TRACING_EXTENSION, HEADER_TRACESTATE, v)?),
            None => None,
        };
        Some(DistributedTracing {
            traceparent,
            tracestate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_with_state() {
        let dt = DistributedTracing::new("0").with_tracestate("congo=4");
        assert_eq!(
            dt.to_headers(),
            vec![
                ("traceparent".to_string(), "0".to_string()),
                ("tracestate".to_string(), "congo=4".to_string()),
            ]
        );
    }

    #[test]
    fn test_headers_without_state() {
        let dt = DistributedTracing::new("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01");
        assert_eq!(dt.to_headers().len(), 1);
    }

    #[test]
    fn test_from_headers_requires_traceparent() {
        let mut headers = Headers::new();
        headers.insert("tracestate", "congo=4");
        assert!(DistributedTracing::from_headers(&headers).is_none());

        headers.insert("traceparent", "0");
        let dt = DistributedTracing::from_headers(&headers).unwrap();
        assert_eq!(dt.traceparent, "0");
        assert_eq!(dt.tracestate.as_deref(), Some("congo=4"));
    }

    #[test]
    fn test_non_utf8_values_not_rewritten() {
        let mut headers = Headers::new();
        headers.insert("traceparent", vec![0xc3u8, 0x28]);
        assert!(DistributedTracing::from_headers(&headers).is_none());

        headers.insert("traceparent", "0");
        headers.insert("tracestate", vec![0xffu8]);
        assert!(DistributedTracing::from_headers(&headers).is_none());
    }
}

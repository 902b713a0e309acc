//! Payload codec adapter
//!
//! The marshaller never interprets the payload. It calls the serializer it was
//! built with and stores the result as the record value, or hands the record
//! value to the deserializer on the way back.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::kafka::error::{BoxError, CloudEventError, Result};

/// Turns a payload into record value bytes
pub type SerializeFn<T> = dyn Fn(&T) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync;

/// Turns record value bytes back into a payload
pub type DeserializeFn<T> = dyn Fn(&[u8]) -> std::result::Result<T, BoxError> + Send + Sync;

/// JSON serializer backed by serde_json
pub fn json_serializer<T: Serialize + 'static>(
) -> impl Fn(&T) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync + 'static {
    |data: &T| serde_json::to_vec(data).map_err(|e| Box::new(e) as BoxError)
}

/// JSON deserializer backed by serde_json
pub fn json_deserializer<T: DeserializeOwned + 'static>(
) -> impl Fn(&[u8]) -> std::result::Result<T, BoxError> + Send + Sync + 'static {
    |bytes: &[u8]| serde_json::from_slice(bytes).map_err(|e| Box::new(e) as BoxError)
}

/// UTF-8 text serializer for `String` payloads
pub fn text_serializer() -> impl Fn(&String) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync
{
    |data: &String| Ok(data.as_bytes().to_vec())
}

/// UTF-8 text deserializer for `String` payloads
pub fn text_deserializer() -> impl Fn(&[u8]) -> std::result::Result<String, BoxError> + Send + Sync
{
    |bytes: &[u8]| String::from_utf8(bytes.to_vec()).map_err(|e| Box::new(e) as BoxError)
}

/// Serialize the payload, if any
///
/// No payload yields no value. A payload that serializes to zero bytes yields
/// `Some` of an empty value; the two stay distinct.
pub(crate) fn encode_payload<T>(serializer: &SerializeFn<T>, data: Option<&T>) -> Result<Option<Bytes>> {
    match data {
        Some(data) => serializer(data)
            .map(|bytes| Some(Bytes::from(bytes)))
            .map_err(CloudEventError::PayloadEncoding),
        None => Ok(None),
    }
}

/// Deserialize the record value, if any
pub(crate) fn decode_payload<T>(
    deserializer: &DeserializeFn<T>,
    value: Option<&[u8]>,
) -> Result<Option<T>> {
    match value {
        Some(bytes) => deserializer(bytes)
            .map(Some)
            .map_err(CloudEventError::PayloadDecoding),
        None => Ok(None),
    }
}

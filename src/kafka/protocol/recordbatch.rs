// RecordBatch wire codec
//
// Converts between marshalled records and the Kafka RecordBatch v2 format
// (Kafka 0.11+, the first version with record headers). The kafka-protocol
// crate handles varints, CRC32C and compression.
//
// Wire notes:
// - record key and value keep the null vs zero-length distinction
// - header order is preserved; a null header value reads back as empty
// - the batch header map is keyed by name, so duplicate header names
//   collapse to the last value when encoding

use bytes::{Buf, Bytes, BytesMut};
use kafka_protocol::protocol::StrBytes;
use kafka_protocol::records::{
    Compression, Record, RecordBatchDecoder, RecordBatchEncoder, RecordEncodeOptions,
    TimestampType,
};
use tracing::{debug, warn};

use super::super::error::{CloudEventError, Result};
use super::super::messages::{ConsumerRecord, Headers, ProducerRecord, RecordHeader};

/// Encode records into a single RecordBatch v2
///
/// Offsets are relative to the batch (0, 1, ...); the broker assigns the
/// real ones. All records share the current wall-clock timestamp.
pub fn encode_record_batch(records: &[ProducerRecord], compression: Compression) -> Result<Bytes> {
    if records.is_empty() {
        return Ok(Bytes::new());
    }

    let timestamp = chrono::Utc::now().timestamp_millis();
    let mut kafka_records = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let mut seen = std::collections::HashSet::new();
        for header in record.headers.iter() {
            if !seen.insert(header.key.as_str()) {
                warn!(
                    topic = %record.topic,
                    header = %header.key,
                    "Duplicate header name collapses to its last value in RecordBatch"
                );
            }
        }

        kafka_records.push(Record {
            transactional: false,
            control: false,
            partition_leader_epoch: 0,
            producer_id: -1,
            producer_epoch: -1,
            timestamp_type: TimestampType::Creation,
            offset: i as i64,
            sequence: i as i32,
            timestamp,
            key: record.key.clone(),
            value: record.value.clone(),
            headers: record
                .headers
                .iter()
                .map(|h| (StrBytes::from_string(h.key.clone()), Some(h.value.clone())))
                .collect(),
        });
    }

    let mut encoded = BytesMut::new();
    RecordBatchEncoder::encode(
        &mut encoded,
        kafka_records.iter(),
        &RecordEncodeOptions {
            version: 2,
            compression,
        },
    )?;

    debug!(
        records = records.len(),
        bytes = encoded.len(),
        "Encoded RecordBatch"
    );
    Ok(encoded.freeze())
}

/// Parse one or more concatenated RecordBatches into consumer records
///
/// `topic` and `partition` describe where the bytes were fetched from; the
/// batch itself does not carry them.
pub fn parse_record_batch(
    topic: &str,
    partition: i32,
    batch_bytes: &Bytes,
) -> Result<Vec<ConsumerRecord>> {
    if batch_bytes.is_empty() {
        return Ok(Vec::new());
    }

    debug!(
        topic = %topic,
        partition,
        bytes = batch_bytes.len(),
        "Parsing RecordBatch"
    );

    let mut buf = batch_bytes.clone();
    let mut records = Vec::new();

    while buf.has_remaining() {
        let record_set = RecordBatchDecoder::decode(&mut buf).map_err(|e| {
            CloudEventError::Encoding(format!(
                "invalid RecordBatch for {}/{}: {}",
                topic, partition, e
            ))
        })?;

        for record in record_set.records {
            if record.control {
                continue;
            }

            let headers: Headers = record
                .headers
                .into_iter()
                .map(|(k, v)| RecordHeader::new(k.to_string(), v.unwrap_or_default()))
                .collect();

            records.push(ConsumerRecord {
                topic: topic.to_string(),
                partition,
                offset: record.offset,
                timestamp: Some(record.timestamp),
                key: record.key,
                headers,
                value: record.value,
            });
        }
    }

    Ok(records)
}

//! Kafka-compatible partitioner
//!
//! Used by the in-memory [`MockProducer`](super::mock::MockProducer) to place
//! records the way a real Kafka client would when the record carries no
//! explicit partition.
//!
//! Uses the `murmur2` crate with `KAFKA_SEED` for hash-based routing,
//! matching Apache Kafka's default partitioner behavior. Keyless records go
//! to a random partition.

use murmur2::{murmur2, KAFKA_SEED};
use rand::Rng;

use super::messages::ProducerRecord;

/// Compute the target partition for a record.
///
/// # Behavior
/// - `explicit` partitions are returned unchanged (range checks belong to
///   the caller, which knows the topic layout)
/// - keyed records use murmur2 for deterministic routing
/// - keyless records use random selection
pub fn compute_partition(key: Option<&[u8]>, partition_count: i32, explicit: Option<i32>) -> i32 {
    debug_assert!(partition_count > 0, "partition_count must be positive");

    if let Some(partition) = explicit {
        return partition;
    }

    match key {
        // Utils.toPositive(Utils.murmur2(key)) % numPartitions
        Some(k) => ((murmur2(k, KAFKA_SEED) & 0x7fffffff) as i32) % partition_count,
        None => rand::thread_rng().gen_range(0..partition_count),
    }
}

/// Partition a producer record would land on
pub fn partition_for(record: &ProducerRecord, partition_count: i32) -> i32 {
    compute_partition(record.key.as_deref(), partition_count, record.partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::messages::Headers;
    use bytes::Bytes;

    fn record(key: Option<&'static str>, partition: Option<i32>) -> ProducerRecord {
        ProducerRecord {
            topic: "binary.t".to_string(),
            partition,
            key: key.map(|k| Bytes::from_static(k.as_bytes())),
            headers: Headers::new(),
            value: None,
        }
    }

    #[test]
    fn test_explicit_partition_passes_through() {
        assert_eq!(compute_partition(Some(b"key"), 10, Some(5)), 5);
        assert_eq!(compute_partition(None, 10, Some(3)), 3);
    }

    #[test]
    fn test_event_id_keys_are_sticky() {
        // Events keyed by id must land on the same partition every time
        let first = partition_for(&record(Some("x10"), None), 12);
        for _ in 0..10 {
            assert_eq!(partition_for(&record(Some("x10"), None), 12), first);
        }
        assert!((0..12).contains(&first));
    }

    #[test]
    fn test_keys_spread_over_partitions() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..500 {
            let key = format!("subject-{}", i);
            seen.insert(compute_partition(Some(key.as_bytes()), 16, None));
        }
        assert!(seen.len() > 8, "only {} partitions used", seen.len());
    }

    #[test]
    fn test_keyless_records_stay_in_range() {
        for _ in 0..100 {
            let p = partition_for(&record(None, None), 4);
            assert!((0..4).contains(&p), "partition {} out of range", p);
        }
    }

    #[test]
    fn test_single_partition_topic() {
        assert_eq!(partition_for(&record(Some("a"), None), 1), 0);
        assert_eq!(partition_for(&record(None, None), 1), 0);
        assert_eq!(partition_for(&record(None, Some(0)), 1), 0);
    }
}

// Kafka wire format support
//
// Only the RecordBatch layer is needed: the marshaller works on records, and
// request framing belongs to the transport client.

mod recordbatch;

pub use kafka_protocol::records::Compression;
pub use recordbatch::{encode_record_batch, parse_record_batch};

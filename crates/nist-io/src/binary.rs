//! Fixed-layout binary reader/writer for record types 3–6 and 8 (spec §4.8).
//!
//! Every binary record is `u32 LEN, u8 IDC, payload...`; fields are
//! recovered by position, not by tag. This workspace represents the three
//! positions as fields 0 (LEN), 1 (IDC), 2 (opaque payload) so the same
//! `substitute_item`/LEN-fixed-point machinery in `nist-core` applies to
//! both dialects.

use crate::error::NistIoError;
use bytes_io::{ByteSink, ByteSource};
use log::debug;
use nist_core::{append_field, append_item, append_subfield, DataKind, Field, Item, Record, Subfield};

pub const LEN_FIELD: u16 = 0;
pub const IDC_FIELD: u16 = 1;
pub const PAYLOAD_FIELD: u16 = 2;

pub fn is_binary_record(record_type: u16) -> bool {
    matches!(record_type, 3 | 4 | 5 | 6 | 8)
}

fn single_item_field(record_type: u16, field_id: u16, bytes: Vec<u8>) -> Field {
    let mut field = Field::new(record_type, field_id);
    let mut subfield = Subfield::new();
    append_item(&mut subfield, Item::new(bytes));
    append_subfield(&mut field, subfield);
    field
}

pub fn read_binary_record(src: &mut dyn ByteSource, record_type: u16) -> Result<Record, NistIoError> {
    let len = src.read_u32_be()?;
    let idc = src.read_u8()?;
    if (len as usize) < 5 {
        return Err(NistIoError::Malformed(format!(
            "binary record LEN {len} shorter than its own 5-byte header"
        )));
    }
    let payload = src.read_bytes(len as usize - 5)?;
    debug!("read binary record type {record_type}, len {len}, idc {idc}");

    let mut record = Record::new(record_type, DataKind::Binary)?;
    record.total_bytes = len;
    append_field(&mut record, single_item_field(record_type, LEN_FIELD, len.to_be_bytes().to_vec()));
    append_field(&mut record, single_item_field(record_type, IDC_FIELD, vec![idc]));
    append_field(&mut record, single_item_field(record_type, PAYLOAD_FIELD, payload));
    Ok(record)
}

pub fn write_binary_record(sink: &mut dyn ByteSink, record: &Record) -> Result<(), NistIoError> {
    let len_bytes = record
        .field(LEN_FIELD)
        .and_then(Field::first_item)
        .map(|item| item.bytes.clone())
        .ok_or_else(|| NistIoError::Malformed("binary record missing LEN field".into()))?;
    if len_bytes.len() != 4 {
        return Err(NistIoError::Malformed(format!(
            "LEN field is {} bytes, expected 4",
            len_bytes.len()
        )));
    }
    sink.write_bytes(&len_bytes)?;

    let idc = record
        .field(IDC_FIELD)
        .and_then(Field::first_item)
        .and_then(|item| item.bytes.first().copied())
        .ok_or_else(|| NistIoError::Malformed("binary record missing IDC field".into()))?;
    sink.write_u8(idc)?;

    if let Some(payload) = record.field(PAYLOAD_FIELD).and_then(Field::first_item) {
        sink.write_bytes(&payload.bytes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_io::{BufferSink, BufferSource};

    #[test]
    fn binary_record_roundtrip() {
        let payload = vec![1, 2, 3, 4, 5];
        let len = (5 + payload.len()) as u32;
        let mut bytes = len.to_be_bytes().to_vec();
        bytes.push(7); // IDC
        bytes.extend_from_slice(&payload);

        let mut src = BufferSource::new(&bytes);
        let record = read_binary_record(&mut src, 4).unwrap();
        assert_eq!(record.record_type, 4);
        assert_eq!(record.field(IDC_FIELD).unwrap().first_item().unwrap().bytes, vec![7]);
        assert_eq!(record.field(PAYLOAD_FIELD).unwrap().first_item().unwrap().bytes, payload);

        let mut sink = BufferSink::new();
        write_binary_record(&mut sink, &record).unwrap();
        assert_eq!(sink.into_inner(), bytes);
    }

    #[test]
    fn record_shorter_than_header_is_malformed() {
        let bytes = vec![0, 0, 0, 3, 1]; // LEN=3 < 5
        let mut src = BufferSource::new(&bytes);
        assert!(matches!(read_binary_record(&mut src, 3), Err(NistIoError::Malformed(_))));
    }
}

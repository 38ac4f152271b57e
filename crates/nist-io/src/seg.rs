//! Type-14 SEG field lookup: the finger-position bounding boxes an
//! optional SEG field lists against a tagged image record, grounded on
//! `nbis/lib/an2k/seg.c`'s `biomeval_nbis_lookup_type14_segments`.

use crate::error::NistIoError;
use nist_core::Record;

/// Field ID of the Type-14 SEG field: one subfield per finger segment,
/// five items `(finger, left, right, top, bottom)`.
pub const SEG_FIELD: u16 = 21;

const TYPE_14: u16 = 14;

/// One finger segment's bounding box, as carried by a SEG subfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerSegment {
    pub finger: u32,
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Looks up the SEG field on a Type-14 record and parses its subfields
/// into segment rectangles. A Type-14 record with no SEG field (the
/// common case) yields an empty vector rather than an error, matching
/// `seg.c`'s "not found" return (`*onsgs = 0`).
pub fn lookup_type14_segments(record: &Record) -> Result<Vec<FingerSegment>, NistIoError> {
    if record.record_type != TYPE_14 {
        return Err(NistIoError::Malformed(format!(
            "lookup_type14_segments: record is type {}, not Type-14",
            record.record_type
        )));
    }

    let Some(field) = record.field(SEG_FIELD) else {
        return Ok(Vec::new());
    };

    let mut segments = Vec::with_capacity(field.subfields.len());
    for subfield in &field.subfields {
        let parse = |index: usize, name: &str| -> Result<u32, NistIoError> {
            subfield
                .items
                .get(index)
                .ok_or_else(|| NistIoError::Malformed(format!("SEG subfield missing {name}")))?
                .as_str()
                .trim()
                .parse()
                .map_err(|_| NistIoError::Malformed(format!("SEG {name} is not numeric")))
        };
        segments.push(FingerSegment {
            finger: parse(0, "finger")?,
            left: parse(1, "left")?,
            right: parse(2, "right")?,
            top: parse(3, "top")?,
            bottom: parse(4, "bottom")?,
        });
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nist_core::{append_field, append_item, append_subfield, DataKind, Field, Item, Subfield};

    fn segment_field(entries: &[(u32, u32, u32, u32, u32)]) -> Field {
        let mut field = Field::new(TYPE_14, SEG_FIELD);
        for &(finger, left, right, top, bottom) in entries {
            let mut subfield = Subfield::new();
            for value in [finger, left, right, top, bottom] {
                append_item(&mut subfield, Item::new(value.to_string().into_bytes()));
            }
            append_subfield(&mut field, subfield);
        }
        field
    }

    #[test]
    fn no_seg_field_yields_empty_segments() {
        let record = Record::new(TYPE_14, DataKind::Mixed).unwrap();
        assert_eq!(lookup_type14_segments(&record).unwrap(), Vec::new());
    }

    #[test]
    fn seg_field_parses_one_segment_per_subfield() {
        let mut record = Record::new(TYPE_14, DataKind::Mixed).unwrap();
        append_field(&mut record, segment_field(&[(1, 0, 100, 0, 150), (2, 50, 200, 10, 175)]));

        let segments = lookup_type14_segments(&record).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], FingerSegment { finger: 1, left: 0, right: 100, top: 0, bottom: 150 });
        assert_eq!(segments[1].finger, 2);
    }

    #[test]
    fn wrong_record_type_is_rejected() {
        let record = Record::new(13, DataKind::Mixed).unwrap();
        assert!(matches!(lookup_type14_segments(&record), Err(NistIoError::Malformed(_))));
    }
}

//! `substitute_item` and the LEN-recomputation fixed point (spec §4.6, §3).

use crate::error::ModelError;
use crate::model::{DataKind, File};
use crate::path::IndexPath;
use log::trace;

/// Field ID of the `.001` LEN item on a tagged record.
const TAGGED_LEN_FIELD: u16 = 1;
/// Field ID this workspace uses for the fixed 4-byte LEN prefix of a binary record.
const BINARY_LEN_FIELD: u16 = 0;

/// Bound on fixed-point iterations: the LEN item's own text length can only
/// grow the record by a handful of bytes per digit, so this converges in
/// one or two passes in practice.
const MAX_FIXED_POINT_PASSES: usize = 8;

impl File {
    /// Replace an item's raw bytes. If the mutated item is the LEN item of
    /// a tagged record, or the fixed-offset LEN field of a binary record, a
    /// second pass recomputes the length to a fixed point: the declared
    /// length's own encoded size can change the record's size, which can
    /// change the length again (spec §4.6).
    pub fn substitute_item(&mut self, path: &IndexPath, new_bytes: Vec<u8>) -> Result<(), ModelError> {
        let record_index = path.record.ok_or_else(|| ModelError::AmbiguousPath(format!("{path:?}")))?;
        let field_id = path.field_id.ok_or_else(|| ModelError::AmbiguousPath(format!("{path:?}")))?;
        let subfield_index = path.subfield.unwrap_or(0);
        let item_index = path.item.ok_or_else(|| ModelError::AmbiguousPath(format!("{path:?}")))?;

        {
            let record = self
                .records
                .get_mut(record_index)
                .ok_or(ModelError::NoSuchRecord(record_index))?;
            let record_type = record.record_type;
            let field = record
                .field_mut(field_id)
                .ok_or(ModelError::NoSuchField(record_type, field_id))?;
            let subfield = field
                .subfields
                .get_mut(subfield_index)
                .ok_or(ModelError::NoSuchSubfield(subfield_index))?;
            let item = subfield
                .items
                .get_mut(item_index)
                .ok_or(ModelError::NoSuchItem(item_index))?;
            item.bytes = new_bytes;
        }
        trace!("substituted record {record_index} field {field_id} subfield {subfield_index} item {item_index}");

        // Any mutation can change the record's total size, so the LEN item
        // (or the binary LEN prefix) is always brought back to a fixed
        // point — not only when the caller targeted it directly. If the
        // LEN item itself was just targeted, this doubles as the "second
        // pass" spec §4.6 calls for.
        self.recompute_len_fixed_point(record_index)
    }

    fn recompute_len_fixed_point(&mut self, record_index: usize) -> Result<(), ModelError> {
        for _ in 0..MAX_FIXED_POINT_PASSES {
            let (data_kind, len_field_id, declared) = {
                let record = self.records.get(record_index).ok_or(ModelError::NoSuchRecord(record_index))?;
                let len_field_id = match record.data_kind {
                    DataKind::Binary => BINARY_LEN_FIELD,
                    DataKind::Ascii | DataKind::Mixed => TAGGED_LEN_FIELD,
                };
                (record.data_kind, len_field_id, record.num_bytes() as u32)
            };

            let record = self.records.get_mut(record_index).ok_or(ModelError::NoSuchRecord(record_index))?;
            record.total_bytes = declared;

            let Some(len_field) = record.field_mut(len_field_id) else {
                return Ok(());
            };
            let Some(subfield) = len_field.subfields.first_mut() else {
                return Ok(());
            };
            let Some(item) = subfield.items.first_mut() else {
                return Ok(());
            };

            let new_bytes = match data_kind {
                DataKind::Binary => declared.to_be_bytes().to_vec(),
                DataKind::Ascii | DataKind::Mixed => declared.to_string().into_bytes(),
            };
            if item.bytes == new_bytes {
                return Ok(());
            }
            item.bytes = new_bytes;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{append_field, append_item, append_subfield, Field, Item, Record, Subfield};

    fn tagged_record() -> (File, usize) {
        let mut file = File::new("0300");
        let mut record = Record::new(1, DataKind::Ascii).unwrap();

        let mut len_field = Field::new(1, 1);
        let mut len_sub = Subfield::new();
        append_item(&mut len_sub, Item::new(b"4".to_vec()));
        append_subfield(&mut len_field, len_sub);
        append_field(&mut record, len_field);

        let mut payload_field = Field::new(1, 2);
        let mut payload_sub = Subfield::new();
        append_item(&mut payload_sub, Item::new(b"A".to_vec()));
        append_subfield(&mut payload_field, payload_sub);
        append_field(&mut record, payload_field);

        file.append_record(record);
        (file, 0)
    }

    #[test]
    fn substituting_payload_recomputes_len_item() {
        let (mut file, record_index) = tagged_record();
        let path = IndexPath::new().record(record_index).field(2).subfield(0).item(0);
        file.substitute_item(&path, b"a much longer payload value".to_vec()).unwrap();

        let len_path = IndexPath::new().record(record_index).field(1).subfield(0).item(0);
        let located = file.resolve(&len_path).unwrap();
        let declared: usize = match located {
            crate::model::Located::Item(item) => {
                std::str::from_utf8(&item.bytes).unwrap().parse().unwrap()
            }
            _ => unreachable!(),
        };
        assert_eq!(declared, file.records[record_index].num_bytes());
    }

    #[test]
    fn non_len_field_substitution_still_recomputes_len() {
        let (mut file, record_index) = tagged_record();
        let before = file.records[record_index].field(1).unwrap().clone();
        let path = IndexPath::new().record(record_index).field(2).subfield(0).item(0);
        file.substitute_item(&path, b"AB".to_vec()).unwrap();
        // field 2 grew by a byte, so the record's total size changed even
        // though field 1 (LEN) was never targeted directly.
        assert_ne!(file.records[record_index].field(1).unwrap(), &before);
    }
}

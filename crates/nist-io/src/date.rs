//! Creation-date formatting for the Type-1 header, grounded on
//! `nbis/lib/an2k/date.c`'s `biomeval_nbis_get_ANSI_NIST_date`.
//!
//! The original hand-parses `ctime`'s fixed-format string with substring
//! arithmetic to assemble a `CCYYMMDD` value. `chrono` already gives this
//! workspace calendar primitives (used by `nist-conformance`'s Date/Gmt
//! item checks), so formatting is a single call; the caller supplies the
//! date rather than this function reading the clock itself, keeping it
//! deterministic and testable (spec §9 "use the language's calendar
//! primitives").

use crate::error::NistIoError;
use chrono::{Datelike, NaiveDate};
use nist_core::{File, IndexPath};

const TYPE_1: u16 = 1;
/// Field ID of the Type-1 creation-date (`DAT`) field.
const CREATION_DATE_FIELD: u16 = 14;

/// Formats a calendar date as the `CCYYMMDD` string the Type-1 `.014`
/// field expects.
pub fn format_creation_date(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Writes `date` into the file's Type-1 `.014` creation-date field,
/// recomputing the record's LEN through the usual substitution path.
pub fn stamp_creation_date(file: &mut File, date: NaiveDate) -> Result<(), NistIoError> {
    let record_index = file
        .records
        .iter()
        .position(|record| record.record_type == TYPE_1)
        .ok_or_else(|| NistIoError::Malformed("file has no Type-1 header record".into()))?;

    let path = IndexPath::new().record(record_index).field(CREATION_DATE_FIELD).subfield(0).item(0);
    file.substitute_item(&path, format_creation_date(date).into_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nist_core::{append_field, append_item, append_subfield, DataKind, Field, Item, Record, Subfield};

    fn text_field(record_type: u16, field_id: u16, value: &str) -> Field {
        let mut field = Field::new(record_type, field_id);
        let mut subfield = Subfield::new();
        append_item(&mut subfield, Item::new(value.as_bytes().to_vec()));
        append_subfield(&mut field, subfield);
        field
    }

    #[test]
    fn formats_as_ccyymmdd() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 26).unwrap();
        assert_eq!(format_creation_date(date), "20260726");
    }

    #[test]
    fn stamps_type_1_creation_date_field() {
        let mut file = File::new("0300");
        let mut record = Record::new(TYPE_1, DataKind::Ascii).unwrap();
        append_field(&mut record, text_field(TYPE_1, 1, "0000"));
        append_field(&mut record, text_field(TYPE_1, CREATION_DATE_FIELD, "19990101"));
        file.append_record(record);

        let date = NaiveDate::from_ymd_opt(2026, 7, 26).unwrap();
        stamp_creation_date(&mut file, date).unwrap();

        let stamped = file.records[0].field(CREATION_DATE_FIELD).unwrap().first_item().unwrap();
        assert_eq!(stamped.as_str(), "20260726");
    }

    #[test]
    fn missing_type_1_record_is_rejected() {
        let mut file = File::new("0300");
        let mut record = Record::new(2, DataKind::Ascii).unwrap();
        append_field(&mut record, text_field(2, 1, "0000"));
        file.append_record(record);

        let date = NaiveDate::from_ymd_opt(2026, 7, 26).unwrap();
        assert!(matches!(stamp_creation_date(&mut file, date), Err(NistIoError::Malformed(_))));
    }
}

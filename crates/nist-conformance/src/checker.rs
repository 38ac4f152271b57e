//! Walks a decoded [`nist_core::File`] against a loaded specification,
//! accumulating a [`Report`] (spec §4.9, `nbis/lib/an2k/decode.c` walk
//! pattern).

use crate::error::ConformanceError;
use crate::item_checks::{check_item, ItemLocation};
use crate::report::{Category, Report, Severity};
use log::info;
use nist_config::Registry;
use nist_core::{File, Record};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub struct Checker {
    registry: Arc<Registry>,
    standard: String,
}

impl Checker {
    pub fn new(registry: Arc<Registry>, standard: impl Into<String>) -> Self {
        Checker { registry, standard: standard.into() }
    }

    pub fn check_file(&self, file: &File) -> Result<Report, ConformanceError> {
        let mut report = Report::new();
        for record in &file.records {
            self.check_record(record, &mut report)?;
        }
        info!(
            "conformance run: {} fatal, {} error, {} warning",
            report.count(Severity::Fatal),
            report.count(Severity::Error),
            report.count(Severity::Warning),
        );
        Ok(report)
    }

    fn check_record(&self, record: &Record, report: &mut Report) -> Result<(), ConformanceError> {
        let Some(record_spec) = self.registry.resolve_record(&self.standard, record.record_type)? else {
            report.push(
                Severity::Warning,
                Category::Config,
                Some(record.record_type),
                None,
                format!("skipping unknown record type {}", record.record_type),
            );
            return Ok(());
        };

        let mut seen: HashSet<u16> = HashSet::new();
        let mut counts: HashMap<u16, u32> = HashMap::new();
        for field in &record.fields {
            seen.insert(field.field_id);
            *counts.entry(field.field_id).or_default() += 1;
        }

        for field in &record.fields {
            let Some(field_spec) = self.registry.resolve_field(&self.standard, record.record_type, field.field_id)?
            else {
                report.push(
                    Severity::Warning,
                    Category::Config,
                    Some(record.record_type),
                    Some(field.field_id),
                    "field has no specification entry".to_string(),
                );
                continue;
            };

            let occurrences = counts.get(&field.field_id).copied().unwrap_or(0);
            if let Some(max) = field_spec.occurrence.max {
                if occurrences > max {
                    report.push(
                        Severity::Error,
                        Category::Check,
                        Some(record.record_type),
                        Some(field.field_id),
                        format!("field occurs {occurrences} times, declared max is {max}"),
                    );
                }
            }

            let size = field.num_bytes(record.data_kind);
            if !field_spec.size.contains(&size) {
                report.push(
                    Severity::Error,
                    Category::Check,
                    Some(record.record_type),
                    Some(field.field_id),
                    format!("field is {size} bytes, outside declared size range"),
                );
            }

            let loc = ItemLocation { record_type: record.record_type, field_id: field.field_id };
            for item_spec in &field_spec.items {
                for subfield in &field.subfields {
                    for item in &subfield.items {
                        check_item(report, &loc, item_spec, item);
                    }
                }
            }
        }

        for field_spec in record_spec.fields.values() {
            let required = field_spec.required || field_spec.occurrence.min.unwrap_or(0) >= 1;
            if required && !seen.contains(&field_spec.field_id) {
                report.push(
                    Severity::Error,
                    Category::Check,
                    Some(record.record_type),
                    Some(field_spec.field_id),
                    format!("required field {} is missing", field_spec.field_id),
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nist_config::{DataKindTag, FieldSpec, ItemSpec, ItemType, RecordSpec, Specification};
    use nist_core::{append_field, append_item, append_subfield, DataKind, Field, Item, Subfield};

    fn make_record(record_type: u16, field_id: u16, value: &str) -> Record {
        let mut record = Record::new(record_type, DataKind::Ascii).unwrap();
        let mut field = Field::new(record_type, field_id);
        let mut subfield = Subfield::new();
        append_item(&mut subfield, Item::new(value.as_bytes().to_vec()));
        append_subfield(&mut field, subfield);
        append_field(&mut record, field);
        record
    }

    fn registry_with(record_type: u16, field_id: u16) -> Arc<Registry> {
        let mut field_spec = FieldSpec::new(record_type, field_id);
        field_spec.occurrence.min = Some(1);
        field_spec.occurrence.max = Some(1);
        field_spec.items.push(ItemSpec::new(ItemType::Num));

        let mut record_spec = RecordSpec::new(record_type, DataKindTag::Ascii);
        record_spec.fields.insert(field_id, field_spec);

        let mut spec = Specification::new("TEST");
        spec.records.insert(record_type, record_spec);

        let mut registry = Registry::new();
        registry.insert(spec);
        Arc::new(registry)
    }

    #[test]
    fn unknown_record_type_is_a_warning_not_fatal() {
        let registry = Arc::new(Registry::new());
        let checker = Checker::new(registry, "TEST");
        let mut file = File::new("0300");
        file.append_record(make_record(99, 1, "1"));
        let report = checker.check_file(&file).unwrap();
        assert_eq!(report.count(Severity::Warning), 1);
        assert!(report.is_conformant());
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let registry = registry_with(1, 3);
        let checker = Checker::new(registry, "TEST");
        let mut file = File::new("0300");
        file.append_record(Record::new(1, DataKind::Ascii).unwrap());
        let report = checker.check_file(&file).unwrap();
        assert!(!report.is_conformant());
        assert_eq!(report.count(Severity::Error), 1);
    }

    #[test]
    fn valid_record_is_conformant() {
        let registry = registry_with(1, 3);
        let checker = Checker::new(registry, "TEST");
        let mut file = File::new("0300");
        file.append_record(make_record(1, 3, "7"));
        let report = checker.check_file(&file).unwrap();
        assert!(report.is_conformant(), "{:?}", report.findings);
    }
}

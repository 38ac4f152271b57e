//! The in-memory specification tree: standard → records → fields → items,
//! plus named lists and options (spec §4.9, §6).

use std::collections::HashMap;

/// Data-kind tag a record's fields are expected to carry; mirrors
/// `nist_core::DataKind` but this crate has no dependency on the record
/// model, so the tag is repeated here at the configuration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKindTag {
    Ascii,
    Binary,
    Mixed,
}

/// Per-item type tag (spec §4.9's `{Num, SNum, CNum, Hex, FP, Str, Bin,
/// Date, Gmt, Image}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Num,
    SNum,
    CNum,
    Hex,
    Fp,
    Str,
    Bin,
    Date,
    Gmt,
    Image,
}

impl ItemType {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "num" => ItemType::Num,
            "snum" => ItemType::SNum,
            "cnum" => ItemType::CNum,
            "hex" => ItemType::Hex,
            "fp" => ItemType::Fp,
            "str" => ItemType::Str,
            "bin" => ItemType::Bin,
            "date" => ItemType::Date,
            "gmt" => ItemType::Gmt,
            "image" => ItemType::Image,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd> Range<T> {
    pub fn contains(&self, value: &T) -> bool {
        let above_min = match &self.min {
            Some(m) => value >= m,
            None => true,
        };
        let below_max = match &self.max {
            Some(m) => value <= m,
            None => true,
        };
        above_min && below_max
    }
}

/// One declared item slot inside a field spec.
#[derive(Debug, Clone)]
pub struct ItemSpec {
    pub item_type: ItemType,
    pub numeric_range: Range<i64>,
    pub enum_values: Option<Vec<String>>,
}

impl ItemSpec {
    pub fn new(item_type: ItemType) -> Self {
        ItemSpec { item_type, numeric_range: Range::default(), enum_values: None }
    }
}

/// `(record_type, field_id)`-keyed field spec.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub record_type: u16,
    pub field_id: u16,
    pub occurrence: Range<u32>,
    pub size: Range<usize>,
    pub items: Vec<ItemSpec>,
    pub custom_check: Option<String>,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(record_type: u16, field_id: u16) -> Self {
        FieldSpec {
            record_type,
            field_id,
            occurrence: Range { min: Some(0), max: None },
            size: Range::default(),
            items: Vec::new(),
            custom_check: None,
            required: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordSpec {
    pub record_type: u16,
    pub data_kind: DataKindTag,
    pub fields: HashMap<u16, FieldSpec>,
}

impl RecordSpec {
    pub fn new(record_type: u16, data_kind: DataKindTag) -> Self {
        RecordSpec { record_type, data_kind, fields: HashMap::new() }
    }
}

/// One named configuration layer. `parent` names another [`Specification`]
/// loaded into the same [`crate::Registry`]; lookups that miss locally walk
/// up through it (spec §4.9 "lookups walk parents depth-first from child to
/// root").
#[derive(Debug, Clone)]
pub struct Specification {
    pub standard: String,
    pub parent: Option<String>,
    pub records: HashMap<u16, RecordSpec>,
    pub lists: HashMap<String, Vec<String>>,
    pub options: HashMap<String, String>,
}

impl Specification {
    pub fn new(standard: impl Into<String>) -> Self {
        Specification {
            standard: standard.into(),
            parent: None,
            records: HashMap::new(),
            lists: HashMap::new(),
            options: HashMap::new(),
        }
    }

    /// Merge `other` on top of `self`: every record/field/list/option `other`
    /// defines overrides the corresponding entry here, matching the
    /// "stacked layers, each overrides the previous" rule (spec §6).
    pub fn overlay(&mut self, other: Specification) {
        for (rt, record) in other.records {
            self.records.insert(rt, record);
        }
        for (name, list) in other.lists {
            self.lists.insert(name, list);
        }
        for (name, value) in other.options {
            self.options.insert(name, value);
        }
        if other.parent.is_some() {
            self.parent = other.parent;
        }
    }
}

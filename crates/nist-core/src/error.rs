use thiserror::Error;

/// Errors surfaced by the in-memory File/Record/Field/Subfield/Item model.
/// Parse errors live in `nist-io`; this crate only rejects tree mutations
/// that would violate the hierarchy's own invariants.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("record index {0} out of bounds")]
    NoSuchRecord(usize),

    #[error("field {1} not found in record type {0}")]
    NoSuchField(u16, u16),

    #[error("subfield index {0} out of bounds")]
    NoSuchSubfield(usize),

    #[error("item index {0} out of bounds")]
    NoSuchItem(usize),

    #[error("path {0:?} does not address a single item")]
    AmbiguousPath(String),

    #[error("record type {0} is reserved and may not be constructed")]
    ReservedRecordType(u16),
}

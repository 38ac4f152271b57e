//! In-memory File/Record/Field/Subfield/Item hierarchy for ANSI/NIST
//! transaction files, with separator-aware size accounting.
//!
//! Parsing and serialization live in `nist-io`; this crate only owns the
//! tree and the mutation primitives spec'd in §4.6 (append_*,
//! substitute_item, path-based lookup).

mod error;
mod model;
mod mutate;
mod path;

pub use error::ModelError;
pub use model::{
    append_field, append_item, append_subfield, is_reserved_record_type, DataKind, Field, File,
    Item, Located, Record, Subfield,
};
pub use path::IndexPath;

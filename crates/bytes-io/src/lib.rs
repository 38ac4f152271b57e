//! Uniform stream-or-buffer byte I/O.
//!
//! A single interface ([`ByteSource`]/[`ByteSink`]) that every parser and
//! serializer in this workspace uses, implemented identically by a
//! stream-backed handle and a bounded memory window. Replaces the
//! original's parallel `read_*`/`scan_*` and `write_*`/`push_*` code paths:
//! parsers are written once against the trait.

mod error;
mod sink;
mod source;

pub use error::IoError;
pub use sink::{BoundedBufferSink, BufferSink, ByteSink, StreamSink};
pub use source::{BufferSource, ByteSource, StreamSource};

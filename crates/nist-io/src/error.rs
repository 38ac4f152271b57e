use bytes_io::IoError;
use nist_core::ModelError;
use thiserror::Error;

/// Errors surfaced while parsing or serializing an ANSI/NIST transaction
/// file. The reader never retries past a structural violation; per spec §7
/// "on a mid-record fatal error, the current record is discarded and
/// parsing halts with the already-decoded prefix preserved" is the caller's
/// responsibility — this crate's functions are record-at-a-time so the
/// caller can keep whatever records already decoded successfully.
#[derive(Error, Debug)]
pub enum NistIoError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("malformed ANSI/NIST record: {0}")]
    Malformed(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

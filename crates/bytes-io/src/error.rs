use thiserror::Error;

/// Errors produced by [`crate::ByteSource`] and [`crate::ByteSink`] implementations.
///
/// Mirrors the three-way return code of the original C macros (`OK`/`EOF`/`ERROR`)
/// as a sum type instead of a `goto err_out`/`goto eof_out` control path.
#[derive(Error, Debug)]
pub enum IoError {
    /// The source was exhausted before the requested element completed.
    #[error("end of data at position {position}")]
    EndOfData { position: u64 },

    /// The underlying handle failed; `position` is where the failure was observed.
    #[error("I/O error at position {position}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        position: u64,
    },

    /// A sink does not have enough remaining capacity to hold the write.
    #[error("overflow: need {needed} bytes, {available} available")]
    Overflow { needed: usize, available: usize },
}

impl IoError {
    pub fn io(source: std::io::Error, position: u64) -> Self {
        IoError::Io { source, position }
    }
}

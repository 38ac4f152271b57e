use bytes_io::IoError;
use thiserror::Error;

/// Errors surfaced by the FMR codec. Codecs never recover mid-record: every
/// error here is caller-visible, per the propagation policy in spec §7.
#[derive(Error, Debug)]
pub enum FmrError {
    #[error(transparent)]
    Io(#[from] IoError),

    /// A structural invariant was violated during parse: bad magic, an
    /// impossible length, a declared count that exceeds remaining bytes.
    #[error("malformed FMR data: {0}")]
    Malformed(String),

    /// A well-formed value is out of the domain. Produced only by the
    /// validator, never by the codec itself.
    #[error("invalid FMR value: {0}")]
    Invalid(String),

    /// A recognized but unimplemented variant, e.g. an unknown FED type in strict mode.
    #[error("unsupported FMR feature: {0}")]
    Unsupported(String),
}

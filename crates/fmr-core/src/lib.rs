//! FMR (Finger Minutiae Record) binary codec.
//!
//! Covers the five wire dialects named by ANSI/NIST-ITL 1-2011/2-2013 and
//! ISO/IEC 19794-2: ANSI-378 (2004), ANSI-2007, ISO full-record, and the two
//! match-on-card dialects (normal and compact). Structural decode/encode
//! lives here; conformance policy (what combinations of otherwise-valid
//! values are acceptable) lives in `fmr-validate`.

mod error;
mod fed;
mod fmd;
mod fmr;
mod format;
mod fvmr;

pub use error::FmrError;
pub use fed::{Cd, Cddb, Dd, ExtractionMethod, Fed, Fedb, Rcd, Rcdb, FED_HEADER_LEN};
pub use fmd::{Fmd, MinutiaType, QUALITY_NOT_REPORTED, QUALITY_UNDEFINED, QUALITY_UNKNOWN_COMPACT};
pub use fmr::{Cbeff, Fmr, ImageMetadata};
pub use format::{
    FormatStd, ANSI07_HDR_LEN, ANSI_HDR_LARGE_LEN, ANSI_HDR_SMALL_LEN, FORMAT_ID, ISO_HDR_LEN,
};
pub use fvmr::{Ansi07Image, Fvmr, ImpressionType};

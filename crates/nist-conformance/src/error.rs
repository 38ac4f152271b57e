use nist_config::ConfigError;
use thiserror::Error;

/// Errors that abort a conformance run outright — as opposed to rule
/// violations, which the checker accumulates into a [`crate::Report`]
/// instead of returning as an `Err` (spec §4.10 "the conformance checker
/// never throws on rule violations; it accumulates them").
#[derive(Error, Debug)]
pub enum ConformanceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("standard {0:?} has no loaded specification")]
    UnknownStandard(String),
}

use thiserror::Error;

/// Errors surfaced while parsing or resolving a configuration specification
/// (spec §6 "configuration file", §4.9's parent-chain lookups).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unterminated block starting at line {line}")]
    UnterminatedBlock { line: usize },

    #[error("unknown block kind {0:?} (expected standard/record/field/item/list/option)")]
    UnknownBlockKind(String),

    #[error("specification {0:?} names parent {1:?} which was never loaded")]
    UnknownParent(String, String),

    #[error("too many stacked configuration layers ({0}, max {1})")]
    TooManyLayers(usize, usize),
}

//! Configuration-specification model for the conformance checker: a
//! brace-block textual grammar (spec §6) parsed into a layered
//! [`Specification`] tree with parent-chain lookup (spec §4.9).

mod error;
mod model;
mod parser;
mod registry;

pub use error::ConfigError;
pub use model::{DataKindTag, FieldSpec, ItemSpec, ItemType, Range, RecordSpec, Specification};
pub use parser::parse_specifications;
pub use registry::Registry;

use log::debug;

/// Suffix appended to a build-provided base directory to find the default
/// configuration file (spec §6 "a build-provided constant plus
/// `/chkan2k/default.conf`").
pub const DEFAULT_CONFIG_SUFFIX: &str = "/chkan2k/default.conf";

/// Spec §6: "up to ten configuration layers may be stacked".
pub const MAX_CONFIG_LAYERS: usize = 10;

/// Parse and overlay a stack of configuration texts, in order, for a single
/// named standard: each layer's records/fields/lists/options override the
/// previous layer's (spec §6 "each overrides the previous").
pub fn load_layers(standard: &str, layers: &[&str]) -> Result<Specification, ConfigError> {
    if layers.len() > MAX_CONFIG_LAYERS {
        return Err(ConfigError::TooManyLayers(layers.len(), MAX_CONFIG_LAYERS));
    }
    let mut merged: Option<Specification> = None;
    for (i, text) in layers.iter().enumerate() {
        debug!("loading configuration layer {i} of {}", layers.len());
        for spec in parse_specifications(text)? {
            if spec.standard != standard {
                continue;
            }
            match &mut merged {
                Some(existing) => existing.overlay(spec),
                None => merged = Some(spec),
            }
        }
    }
    merged.ok_or_else(|| ConfigError::Parse { line: 0, message: format!("no layer defines standard {standard:?}") })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layer_overrides_earlier_record() {
        let base = r#"
            standard "AN2K-2011" {
                record 1 {
                    data_kind ascii
                }
            }
        "#;
        let override_layer = r#"
            standard "AN2K-2011" {
                record 1 {
                    data_kind mixed
                }
            }
        "#;
        let merged = load_layers("AN2K-2011", &[base, override_layer]).unwrap();
        assert_eq!(merged.records.get(&1).unwrap().data_kind, DataKindTag::Mixed);
    }

    #[test]
    fn too_many_layers_is_rejected() {
        let layer = r#"standard "X" { }"#;
        let layers: Vec<&str> = std::iter::repeat(layer).take(MAX_CONFIG_LAYERS + 1).collect();
        assert!(matches!(load_layers("X", &layers), Err(ConfigError::TooManyLayers(_, _))));
    }
}

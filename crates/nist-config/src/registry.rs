//! A set of loaded [`Specification`]s, resolved by following `parent` chains
//! depth-first from child to root (spec §4.9).

use crate::error::ConfigError;
use crate::model::{FieldSpec, RecordSpec, Specification};
use log::trace;
use std::collections::HashMap;

pub struct Registry {
    specs: HashMap<String, Specification>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { specs: HashMap::new() }
    }

    pub fn insert(&mut self, spec: Specification) {
        self.specs.insert(spec.standard.clone(), spec);
    }

    pub fn get(&self, standard: &str) -> Option<&Specification> {
        self.specs.get(standard)
    }

    fn chain(&self, standard: &str) -> Result<Vec<&Specification>, ConfigError> {
        let mut chain = Vec::new();
        let mut current = standard.to_string();
        loop {
            let spec = self
                .specs
                .get(&current)
                .ok_or_else(|| ConfigError::UnknownParent(standard.to_string(), current.clone()))?;
            chain.push(spec);
            match &spec.parent {
                Some(parent) => current = parent.clone(),
                None => break,
            }
        }
        Ok(chain)
    }

    /// Look up a record spec, walking the parent chain from `standard`
    /// toward the root and returning the first match.
    pub fn resolve_record(&self, standard: &str, record_type: u16) -> Result<Option<&RecordSpec>, ConfigError> {
        for spec in self.chain(standard)? {
            if let Some(record) = spec.records.get(&record_type) {
                trace!("resolved record {record_type} from standard {:?}", spec.standard);
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Look up a field spec the same way, after locating the owning record.
    pub fn resolve_field(
        &self,
        standard: &str,
        record_type: u16,
        field_id: u16,
    ) -> Result<Option<&FieldSpec>, ConfigError> {
        for spec in self.chain(standard)? {
            if let Some(record) = spec.records.get(&record_type) {
                if let Some(field) = record.fields.get(&field_id) {
                    return Ok(Some(field));
                }
            }
        }
        Ok(None)
    }

    pub fn resolve_list(&self, standard: &str, name: &str) -> Result<Option<&[String]>, ConfigError> {
        for spec in self.chain(standard)? {
            if let Some(list) = spec.lists.get(name) {
                return Ok(Some(list.as_slice()));
            }
        }
        Ok(None)
    }

    pub fn resolve_option(&self, standard: &str, name: &str) -> Result<Option<&str>, ConfigError> {
        for spec in self.chain(standard)? {
            if let Some(value) = spec.options.get(name) {
                return Ok(Some(value.as_str()));
            }
        }
        Ok(None)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataKindTag;

    #[test]
    fn child_overrides_parent_but_falls_back_for_unset_records() {
        let mut root = Specification::new("AN2K-2008");
        root.records.insert(1, RecordSpec::new(1, DataKindTag::Ascii));

        let mut child = Specification::new("AN2K-2011");
        child.parent = Some("AN2K-2008".to_string());
        child.records.insert(14, RecordSpec::new(14, DataKindTag::Mixed));

        let mut registry = Registry::new();
        registry.insert(root);
        registry.insert(child);

        assert!(registry.resolve_record("AN2K-2011", 14).unwrap().is_some());
        assert!(registry.resolve_record("AN2K-2011", 1).unwrap().is_some());
        assert!(registry.resolve_record("AN2K-2011", 99).unwrap().is_none());
    }

    #[test]
    fn unknown_standard_is_an_error() {
        let registry = Registry::new();
        assert!(matches!(
            registry.resolve_record("missing", 1),
            Err(ConfigError::UnknownParent(_, _))
        ));
    }
}

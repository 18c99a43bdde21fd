//! Parsing of `terraform output -json`.

use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One entry of `terraform output -json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputValue {
    /// Absent only for malformed entries; those are skipped when printing.
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
    #[serde(default)]
    pub sensitive: bool,
}

impl OutputValue {
    /// Text shown to the operator, or `None` when there is no value.
    pub fn display(&self) -> Option<String> {
        let value = self.value.as_ref()?;
        if self.sensitive {
            return Some("<sensitive>".to_string());
        }
        Some(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

pub type Outputs = BTreeMap<String, OutputValue>;

pub fn parse_outputs(json: &str) -> Result<Outputs> {
    let outputs: Outputs = serde_json::from_str(json)?;
    Ok(outputs)
}

/// `(name, display)` pairs in name order, skipping entries without a value.
pub fn display_lines(outputs: &Outputs) -> Vec<(String, String)> {
    outputs
        .iter()
        .filter_map(|(name, out)| out.display().map(|text| (name.clone(), text)))
        .collect()
}

//! # Fragment Parsing
//!
//! Fragments are written in JSON or YAML; the format follows the file
//! extension. YAML documents are converted into `serde_json::Value` trees
//! before decoding so both formats share one decoder. Non-string YAML map
//! keys (the bare `200:` status codes most response maps use) become
//! strings.

use std::path::Path;

use apispec_core::Fragment;
use serde_json::Value;

use crate::error::SchemaError;

/// On-disk format of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentFormat {
    Json,
    Yaml,
}

impl FragmentFormat {
    /// Format for a path, by extension. `None` for anything that is not
    /// `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Read and decode the fragment at `path`.
///
/// Returns `Ok(None)` when the extension is not a fragment format.
pub fn load_fragment(path: &Path) -> Result<Option<Fragment>, SchemaError> {
    let Some(format) = FragmentFormat::from_path(path) else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value = parse_document(&content, format).map_err(|reason| SchemaError::Parse {
        path: path.to_path_buf(),
        reason,
    })?;

    Fragment::from_value(value)
        .map(Some)
        .map_err(|source| SchemaError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse document text in the given format into a JSON value.
pub fn parse_document(content: &str, format: FragmentFormat) -> Result<Value, String> {
    match format {
        FragmentFormat::Json => {
            serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))
        }
        FragmentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
            yaml_to_json_value(&yaml)
        }
    }
}

/// Convert a `serde_yaml::Value` into the equivalent `serde_json::Value`.
///
/// Tags are dropped in favor of the tagged value.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

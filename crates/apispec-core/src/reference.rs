//! # Local References
//!
//! Fragments point at their own `$defs` map with `{"$ref": "#/$defs/Name"}`.
//! Only that form is resolved here; every other reference is kept as
//! [`Reference::External`] and left for the JSON Schema validator.
//!
//! Two structural operations live here because both the validators and the
//! document builder need them:
//!
//! - [`with_definitions`] builds the schema view handed to the validator:
//!   the sub-schema plus the fragment's `$defs`, so local references
//!   anywhere inside it resolve against the validator's document root.
//! - [`rewrite_local_refs`] moves every local reference to the aggregate
//!   document's `#/components/schemas/` namespace.

use serde_json::{Map, Value};

use crate::fragment::Definitions;

/// Key holding a reference inside a schema object.
pub const REF_KEY: &str = "$ref";

/// Key holding the definitions map inside a fragment or schema.
pub const DEFS_KEY: &str = "$defs";

/// Prefix of a fragment-local reference.
pub const LOCAL_PREFIX: &str = "#/$defs/";

/// Prefix of a reference into the aggregate document's components.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// A parsed `$ref` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `#/$defs/<name>`.
    Local(String),
    /// Any other reference form, kept verbatim.
    External(String),
}

impl Reference {
    /// Classify a raw `$ref` string.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(LOCAL_PREFIX) {
            Some(name) => Self::Local(name.to_string()),
            None => Self::External(raw.to_string()),
        }
    }

    /// Definition name of a local reference.
    pub fn local_name(&self) -> Option<&str> {
        match self {
            Self::Local(name) => Some(name),
            Self::External(_) => None,
        }
    }
}

/// Resolve a raw schema one level through a definitions map.
///
/// Returns the referenced definition when `schema` is a local reference to
/// a name present in `defs`, otherwise `schema` itself.
pub fn resolve_local<'a>(schema: &'a Value, defs: &'a Definitions) -> &'a Value {
    schema
        .get(REF_KEY)
        .and_then(Value::as_str)
        .and_then(|raw| raw.strip_prefix(LOCAL_PREFIX))
        .and_then(|name| defs.get(name))
        .unwrap_or(schema)
}

/// Build the schema view passed to the JSON Schema validator.
///
/// When `defs` is empty, or `schema` is not an object (boolean schemas),
/// the schema is returned unchanged. Otherwise the result carries a `$defs`
/// map made of `defs` overlaid with the schema's own `$defs`; entries the
/// schema declares itself win.
pub fn with_definitions(schema: &Value, defs: &Definitions) -> Value {
    let Some(object) = schema.as_object() else {
        return schema.clone();
    };
    if defs.is_empty() {
        return schema.clone();
    }

    let mut merged: Map<String, Value> = defs.clone();
    if let Some(own) = object.get(DEFS_KEY).and_then(Value::as_object) {
        for (name, definition) in own {
            merged.insert(name.clone(), definition.clone());
        }
    }

    let mut view = object.clone();
    view.insert(DEFS_KEY.to_string(), Value::Object(merged));
    Value::Object(view)
}

/// Rewrite every local reference in `value` to point at
/// `#/components/schemas/`.
///
/// Walks every object and array. Only string values stored under the
/// `$ref` key with the local prefix are replaced; all other data, including
/// strings that merely look like references, is copied as is.
pub fn rewrite_local_refs(value: &Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(key, child)| {
                    let rewritten = match child {
                        Value::String(raw) if key == REF_KEY => match raw.strip_prefix(LOCAL_PREFIX) {
                            Some(name) => Value::String(format!("{COMPONENTS_PREFIX}{name}")),
                            None => child.clone(),
                        },
                        _ => rewrite_local_refs(child),
                    };
                    (key.clone(), rewritten)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(rewrite_local_refs).collect()),
        other => other.clone(),
    }
}

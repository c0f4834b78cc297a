//! # Permitted Parameters
//!
//! Derives a strong-parameters allow-list from a fragment and applies it.
//!
//! | Property schema              | Entry                  | Allow-list form      |
//! |------------------------------|------------------------|----------------------|
//! | object                       | `Nested(name, list)`   | `{"name": [...]}`    |
//! | array of objects             | `Nested(name, list)`   | `{"name": [...]}`    |
//! | any other array              | `ScalarArray(name)`    | `{"name": []}`       |
//! | anything else                | `Field(name)`          | `"name"`             |
//!
//! Body entries come first (JSON schema, else multipart), followed by one
//! `Field` per query parameter. Duplicates are kept.

use apispec_core::{Fragment, ParameterLocation, SchemaNode, JSON_MEDIA_TYPE, MULTIPART_MEDIA_TYPE};
use apispec_core::reference::resolve_local;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

/// Nesting depth after which a self-referencing definition is cut off.
pub const MAX_DEPTH: usize = 32;

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermitEntry {
    /// A scalar value.
    Field(String),
    /// An object, or an array of objects, filtered by the nested list.
    Nested(String, PermitList),
    /// An array of scalars.
    ScalarArray(String),
}

impl PermitEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Nested(name, _) | Self::ScalarArray(name) => name,
        }
    }
}

impl Serialize for PermitEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(name) => serializer.serialize_str(name),
            Self::Nested(name, list) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, list)?;
                map.end()
            }
            Self::ScalarArray(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, &[] as &[PermitEntry])?;
                map.end()
            }
        }
    }
}

/// Ordered allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermitList(Vec<PermitEntry>);

impl PermitList {
    pub fn new(entries: Vec<PermitEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[PermitEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only what the list allows.
    ///
    /// A `Field` keeps a scalar (or null), a `ScalarArray` keeps an array
    /// whose elements are all scalars, and a `Nested` keeps an object
    /// filtered recursively or an array of such objects. Values of the
    /// wrong shape are dropped, as are unlisted keys.
    pub fn apply(&self, params: &Map<String, Value>) -> Map<String, Value> {
        let mut permitted = Map::new();
        for entry in &self.0 {
            let Some(value) = params.get(entry.name()) else {
                continue;
            };
            let kept = match entry {
                PermitEntry::Field(_) => is_scalar(value).then(|| value.clone()),
                PermitEntry::ScalarArray(_) => match value {
                    Value::Array(items) if items.iter().all(is_scalar) => Some(value.clone()),
                    _ => None,
                },
                PermitEntry::Nested(_, nested) => match value {
                    Value::Object(object) => Some(Value::Object(nested.apply(object))),
                    Value::Array(items) => Some(Value::Array(
                        items
                            .iter()
                            .filter_map(Value::as_object)
                            .map(|object| Value::Object(nested.apply(object)))
                            .collect(),
                    )),
                    _ => None,
                },
            };
            if let Some(kept) = kept {
                permitted.insert(entry.name().to_string(), kept);
            }
        }
        permitted
    }
}

impl Serialize for PermitList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for entry in &self.0 {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Derives the allow-list of one fragment.
#[derive(Debug, Clone, Copy)]
pub struct ParameterDeriver<'a> {
    fragment: &'a Fragment,
}

impl<'a> ParameterDeriver<'a> {
    pub fn new(fragment: &'a Fragment) -> Self {
        Self { fragment }
    }

    pub fn permit_list(&self) -> PermitList {
        let mut entries = self.body_entries();

        if let Some(parameters) = self.fragment.parameters() {
            entries.extend(
                parameters
                    .iter()
                    .filter(|p| p.location == ParameterLocation::Query)
                    .map(|p| PermitEntry::Field(p.name.clone())),
            );
        }

        PermitList(entries)
    }

    fn body_entries(&self) -> Vec<PermitEntry> {
        let nodes = self.fragment.nodes();
        let Some(body) = nodes
            .body(JSON_MEDIA_TYPE)
            .or_else(|| nodes.body(MULTIPART_MEDIA_TYPE))
        else {
            return Vec::new();
        };

        if let SchemaNode::Object { properties } = nodes.resolve(body) {
            return self.convert(properties, 0);
        }

        // The top-level body schema contributes its properties even when it
        // does not declare `type: object`.
        let raw = self
            .fragment
            .body_schema(JSON_MEDIA_TYPE)
            .or_else(|| self.fragment.body_schema(MULTIPART_MEDIA_TYPE));
        let properties: Vec<(String, SchemaNode)> = raw
            .map(|schema| resolve_local(schema, self.fragment.defs()))
            .and_then(|schema| schema.get("properties"))
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), SchemaNode::classify(schema)))
                    .collect()
            })
            .unwrap_or_default();
        self.convert(&properties, 0)
    }

    fn convert(&self, properties: &[(String, SchemaNode)], depth: usize) -> Vec<PermitEntry> {
        properties
            .iter()
            .map(|(name, node)| self.entry(name, node, depth))
            .collect()
    }

    fn entry(&self, name: &str, node: &SchemaNode, depth: usize) -> PermitEntry {
        let nodes = self.fragment.nodes();
        let resolved = nodes.resolve(node);

        let nested = match resolved {
            SchemaNode::Object { properties } => Some(properties),
            SchemaNode::Array { items: Some(items) } => match nodes.resolve(items) {
                SchemaNode::Object { properties } => Some(properties),
                _ => return PermitEntry::ScalarArray(name.to_string()),
            },
            SchemaNode::Array { items: None } => return PermitEntry::ScalarArray(name.to_string()),
            _ => None,
        };

        match nested {
            Some(_) if depth >= MAX_DEPTH => {
                warn!(property = name, depth, "permit list nesting limit reached");
                PermitEntry::Field(name.to_string())
            }
            Some(properties) => PermitEntry::Nested(
                name.to_string(),
                PermitList(self.convert(properties, depth + 1)),
            ),
            None => PermitEntry::Field(name.to_string()),
        }
    }
}

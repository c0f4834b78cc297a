//! # Schema Fragments
//!
//! One fragment describes one controller action: its parameters, request
//! body, responses and a local `$defs` map. The typed keys are decoded here;
//! any other top-level key is ignored.
//!
//! Schema-bearing values (`requestBody`, `responses`, `$defs` entries,
//! parameter `schema`) stay raw `serde_json::Value` so the validator and the
//! document builder see them untouched. The schemas this workspace inspects
//! itself are classified once into a [`NodeIndex`] during
//! [`Fragment::from_value`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::node::SchemaNode;

/// Media type of JSON request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Media type of multipart form bodies.
pub const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

/// Ordered `$defs` map: definition name to raw schema.
pub type Definitions = Map<String, Value>;

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// Path segment.
    Path,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParameterLocation {
    /// Lowercase wire name, as written in fragments and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a fragment's `parameters` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter must be present. Absent means `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Raw schema of the parameter value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Documentation keys (`description`, `example`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The entry as written, for key order.
    #[serde(skip)]
    source: Map<String, Value>,
}

impl ParameterDescriptor {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// The descriptor in its written key order.
    ///
    /// Typed fields are laid over the entry as written in the fragment. A
    /// descriptor deserialized on its own starts with `name`, `in`,
    /// `required` and `schema`, then every documentation key.
    pub fn to_value(&self) -> Value {
        let mut object = self.source.clone();
        object.insert("name".into(), Value::String(self.name.clone()));
        object.insert("in".into(), Value::String(self.location.as_str().into()));
        if let Some(required) = self.required {
            object.insert("required".into(), Value::Bool(required));
        }
        if let Some(schema) = &self.schema {
            object.insert("schema".into(), schema.clone());
        }
        for (key, value) in &self.extra {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// Decoded schema fragment for one action.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    parameters: Option<Vec<ParameterDescriptor>>,
    #[serde(default, rename = "requestBody")]
    request_body: Option<Value>,
    #[serde(default)]
    responses: Option<Map<String, Value>>,
    #[serde(default, rename = "$defs")]
    defs: Definitions,
    #[serde(skip)]
    nodes: NodeIndex,
}

impl Fragment {
    /// Decode a fragment from its JSON value and classify its schemas.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let sources: Vec<Map<String, Value>> = value
            .get("parameters")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| entry.as_object().cloned().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        let mut fragment: Fragment = serde_json::from_value(value)?;
        if let Some(parameters) = &mut fragment.parameters {
            for (parameter, source) in parameters.iter_mut().zip(sources) {
                parameter.source = source;
            }
        }
        fragment.nodes = NodeIndex::build(&fragment);
        Ok(fragment)
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    /// Declared parameters, or `None` when the key is absent.
    pub fn parameters(&self) -> Option<&[ParameterDescriptor]> {
        self.parameters.as_deref()
    }

    pub fn request_body(&self) -> Option<&Value> {
        self.request_body.as_ref()
    }

    /// Response descriptors keyed by status (`"200"`, `"2XX"`, `"default"`).
    pub fn responses(&self) -> Option<&Map<String, Value>> {
        self.responses.as_ref()
    }

    /// Local definitions; empty when undeclared.
    pub fn defs(&self) -> &Definitions {
        &self.defs
    }

    /// Classified schemas.
    pub fn nodes(&self) -> &NodeIndex {
        &self.nodes
    }

    /// Raw schema of the request body for `media_type`, when declared
    /// under `requestBody.content`.
    pub fn body_schema(&self, media_type: &str) -> Option<&Value> {
        self.request_body
            .as_ref()?
            .get("content")?
            .get(media_type)?
            .get("schema")
    }

    /// Whether `requestBody` is declared with a `content` map.
    pub fn has_body_content(&self) -> bool {
        self.request_body
            .as_ref()
            .and_then(|body| body.get("content"))
            .is_some_and(Value::is_object)
    }
}

/// Classified view of the schemas a fragment carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeIndex {
    defs: HashMap<String, SchemaNode>,
    parameters: Vec<Option<SchemaNode>>,
    json_body: Option<SchemaNode>,
    form_body: Option<SchemaNode>,
}

impl NodeIndex {
    fn build(fragment: &Fragment) -> Self {
        Self {
            defs: fragment
                .defs()
                .iter()
                .map(|(name, schema)| (name.clone(), SchemaNode::classify(schema)))
                .collect(),
            parameters: fragment
                .parameters()
                .unwrap_or_default()
                .iter()
                .map(|parameter| parameter.schema.as_ref().map(SchemaNode::classify))
                .collect(),
            json_body: fragment.body_schema(JSON_MEDIA_TYPE).map(SchemaNode::classify),
            form_body: fragment
                .body_schema(MULTIPART_MEDIA_TYPE)
                .map(SchemaNode::classify),
        }
    }

    /// Classified `$defs` entry.
    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.defs.get(name)
    }

    /// Classified schema of the parameter at `index` in declaration order.
    pub fn parameter(&self, index: usize) -> Option<&SchemaNode> {
        self.parameters.get(index).and_then(Option::as_ref)
    }

    /// Classified request-body schema for a media type.
    pub fn body(&self, media_type: &str) -> Option<&SchemaNode> {
        match media_type {
            JSON_MEDIA_TYPE => self.json_body.as_ref(),
            MULTIPART_MEDIA_TYPE => self.form_body.as_ref(),
            _ => None,
        }
    }

    /// Follow a local reference one level. Unknown names and non-reference
    /// nodes come back unchanged.
    pub fn resolve<'a>(&'a self, node: &'a SchemaNode) -> &'a SchemaNode {
        node.local_ref()
            .and_then(|name| self.defs.get(name))
            .unwrap_or(node)
    }
}

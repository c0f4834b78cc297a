//! # Schema Node Classification
//!
//! A raw schema is classified once, right after a fragment is decoded, into
//! a closed set of variants. Code that needs to know "what shape is this
//! field" (parameter coercion, permit-list derivation) matches on
//! [`SchemaNode`] instead of probing maps for string-valued `type` keys.

use serde_json::Value;

use crate::reference::{Reference, REF_KEY};

/// Primitive kinds a scalar schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `type: integer`
    Integer,
    /// `type: number`
    Number,
    /// `type: boolean`
    Boolean,
    /// `type: string`
    String,
    /// `type: null`
    Null,
    /// No single recognized `type` (absent, a type list, composition, ...).
    Untyped,
}

/// Classified schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A schema whose `$ref` is a string. Other keywords are ignored.
    Ref(Reference),
    /// `type: object`, with its properties in declaration order.
    Object {
        /// Property name and classified schema.
        properties: Vec<(String, SchemaNode)>,
    },
    /// `type: array`.
    Array {
        /// Classified `items` schema, when declared.
        items: Option<Box<SchemaNode>>,
    },
    /// Any other schema.
    Scalar(ScalarKind),
}

impl SchemaNode {
    /// Classify a raw schema value, recursing into `properties` and `items`.
    pub fn classify(schema: &Value) -> Self {
        if let Some(raw) = schema.get(REF_KEY).and_then(Value::as_str) {
            return Self::Ref(Reference::parse(raw));
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("object") => Self::Object {
                properties: schema
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|properties| {
                        properties
                            .iter()
                            .map(|(name, property)| (name.clone(), Self::classify(property)))
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            Some("array") => Self::Array {
                items: schema.get("items").map(|items| Box::new(Self::classify(items))),
            },
            Some("integer") => Self::Scalar(ScalarKind::Integer),
            Some("number") => Self::Scalar(ScalarKind::Number),
            Some("boolean") => Self::Scalar(ScalarKind::Boolean),
            Some("string") => Self::Scalar(ScalarKind::String),
            Some("null") => Self::Scalar(ScalarKind::Null),
            _ => Self::Scalar(ScalarKind::Untyped),
        }
    }

    /// Name of the local definition this node references, if any.
    pub fn local_ref(&self) -> Option<&str> {
        match self {
            Self::Ref(reference) => reference.local_name(),
            _ => None,
        }
    }
}

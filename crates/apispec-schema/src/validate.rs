//! # Schema Validation
//!
//! Glue between fragments and the `jsonschema` crate (Draft 2020-12).
//!
//! Every sub-schema is validated together with the `$defs` of the fragment
//! it came from (see [`apispec_core::with_definitions`]), so `#/$defs/...`
//! references anywhere inside it resolve against the validator's root.
//!
//! ## Retrieval
//!
//! A local retriever is installed on every validator. It never touches the
//! network: any external `$ref` resolves to the permissive schema `{}`.

use std::fmt;

use apispec_core::{with_definitions, Definitions};
use jsonschema::{Retrieve, Uri, Validator};
use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;

struct LocalRetriever;

impl Retrieve for LocalRetriever {
    fn retrieve(
        &self,
        _uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(serde_json::json!({}))
    }
}

/// A single validator finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON Pointer to the offending part of the instance.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Validator message.
    pub message: String,
}

impl Violation {
    /// The finding as a JSON object, for error-record details.
    pub fn details(&self) -> Value {
        serde_json::json!({
            "instancePath": self.instance_path,
            "schemaPath": self.schema_path,
            "message": self.message,
        })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Compile `schema` (merged with `defs`) into a validator.
pub fn compile(schema: &Value, defs: &Definitions) -> Result<Validator, SchemaError> {
    let view = with_definitions(schema, defs);
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.with_retriever(LocalRetriever);
    opts.build(&view).map_err(|e| SchemaError::Compile {
        reason: e.to_string(),
    })
}

/// Validate `instance` against `schema` merged with `defs`.
///
/// Returns every violation; an empty list means the instance conforms.
pub fn check(instance: &Value, schema: &Value, defs: &Definitions) -> Result<Vec<Violation>, SchemaError> {
    let validator = compile(schema, defs)?;
    Ok(validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect())
}

//! Located validation failures.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fragment::ParameterLocation;

/// One validation failure, serialized as `{error, parameter?, in?, details?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorRecord {
    /// Human-readable message.
    pub error: String,
    /// Offending parameter name, for parameter failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Location of the offending parameter.
    #[serde(default, rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    /// Raw validator output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ValidationErrorRecord {
    /// A record with a message only.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            parameter: None,
            location: None,
            details: None,
        }
    }

    /// A record attributed to a parameter.
    pub fn for_parameter(
        error: impl Into<String>,
        parameter: impl Into<String>,
        location: ParameterLocation,
    ) -> Self {
        Self {
            error: error.into(),
            parameter: Some(parameter.into()),
            location: Some(location),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ValidationErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_only_present_keys() {
        let bare = ValidationErrorRecord::new("Invalid JSON in request body: eof");
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            json!({"error": "Invalid JSON in request body: eof"})
        );

        let located = ValidationErrorRecord::for_parameter(
            "Missing required query parameter: page",
            "page",
            ParameterLocation::Query,
        )
        .with_details(json!({"message": "x"}));
        assert_eq!(
            serde_json::to_value(&located).unwrap(),
            json!({
                "error": "Missing required query parameter: page",
                "parameter": "page",
                "in": "query",
                "details": {"message": "x"}
            })
        );
        assert_eq!(located.to_string(), "Missing required query parameter: page");
    }
}

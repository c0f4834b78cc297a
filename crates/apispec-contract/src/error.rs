//! # Contract Errors
//!
//! Request and response failures carry the full list of
//! [`ValidationErrorRecord`]s; the display message joins their texts so a
//! log line alone is enough to see what was wrong.

use std::path::PathBuf;

use apispec_core::{ActionId, ValidationErrorRecord};
use apispec_schema::SchemaError;
use thiserror::Error;

/// Failure of a contract check.
#[derive(Error, Debug)]
pub enum ContractError {
    /// The incoming request does not match the fragment.
    #[error("Request validation failed: {}", join(.errors))]
    RequestValidation {
        /// Every failure, parameters first.
        errors: Vec<ValidationErrorRecord>,
    },

    /// The handler's response does not match the fragment.
    #[error("Response validation failed: {}", join(.errors))]
    ResponseValidation {
        /// Every failure.
        errors: Vec<ValidationErrorRecord>,
    },

    /// An operation that needs a fragment found none.
    #[error(
        "No OpenAPI schema found for {id}. Permitted parameters require a schema file at {}",
        .expected.display()
    )]
    MissingSchema {
        /// The action without a fragment.
        id: ActionId,
        /// Where the fragment was expected.
        expected: PathBuf,
    },

    /// The request body could not be read or rewound.
    #[error("cannot read request body: {0}")]
    Body(#[from] std::io::Error),

    /// A fragment could not be loaded or one of its schemas compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ContractError {
    /// Records carried by a validation failure; empty for other variants.
    pub fn validation_errors(&self) -> &[ValidationErrorRecord] {
        match self {
            Self::RequestValidation { errors } | Self::ResponseValidation { errors } => errors,
            _ => &[],
        }
    }
}

fn join(errors: &[ValidationErrorRecord]) -> String {
    errors
        .iter()
        .map(|e| e.error.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use apispec_core::ParameterLocation;

    #[test]
    fn request_message_joins_records() {
        let err = ContractError::RequestValidation {
            errors: vec![
                ValidationErrorRecord::for_parameter(
                    "Missing required query parameter: page",
                    "page",
                    ParameterLocation::Query,
                ),
                ValidationErrorRecord::new("Invalid JSON in request body: EOF"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Request validation failed: Missing required query parameter: page, Invalid JSON in request body: EOF"
        );
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn missing_schema_names_expected_file() {
        let err = ContractError::MissingSchema {
            id: ActionId::new("items", "create").unwrap(),
            expected: PathBuf::from("app/views/items/_create.schema.json"),
        };
        let message = err.to_string();
        assert!(message.starts_with("No OpenAPI schema found for items#create."));
        assert!(message.ends_with("app/views/items/_create.schema.json"));
        assert!(err.validation_errors().is_empty());
    }
}

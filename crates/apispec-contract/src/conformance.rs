//! Response conformance assertion for test suites.

use std::path::PathBuf;

use apispec_core::{ActionId, ValidationErrorRecord};
use apispec_schema::{SchemaError, SchemaResolver};
use thiserror::Error;

use crate::error::ContractError;
use crate::response::{ResponseValidator, ResponseView};

/// Why a response failed the conformance assertion.
#[derive(Error, Debug)]
pub enum ConformanceFailure {
    #[error("No OpenAPI schema found for {id}. Expected file at {}", .expected.display())]
    MissingSchema { id: ActionId, expected: PathBuf },

    #[error("{}", nonconformance_message(.id, .errors))]
    Nonconforming {
        id: ActionId,
        errors: Vec<ValidationErrorRecord>,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Contract(ContractError),
}

fn nonconformance_message(id: &ActionId, errors: &[ValidationErrorRecord]) -> String {
    let mut message = format!("Response does not conform to OpenAPI schema for {id}:\n");
    for error in errors {
        message.push_str(&format!("  - {}\n", error.error));
    }
    message
}

/// Check `response` against the fragment of `id`.
///
/// Unlike request-time validation, a missing fragment is a failure here.
pub fn assert_response_conforms(
    resolver: &SchemaResolver,
    id: &ActionId,
    response: &impl ResponseView,
) -> Result<(), ConformanceFailure> {
    let Some(fragment) = resolver.resolve(id)? else {
        return Err(ConformanceFailure::MissingSchema {
            id: id.clone(),
            expected: resolver.store().expected_path(id),
        });
    };

    match ResponseValidator::new(&fragment).validate(response) {
        Ok(()) => Ok(()),
        Err(ContractError::ResponseValidation { errors }) => Err(ConformanceFailure::Nonconforming {
            id: id.clone(),
            errors,
        }),
        Err(other) => Err(ConformanceFailure::Contract(other)),
    }
}

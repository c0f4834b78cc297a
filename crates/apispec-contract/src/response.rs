//! # Response Validation
//!
//! After the handler ran, its JSON body is checked against the response
//! declared for the returned status. Lookup order for the status key:
//! the exact code (`"201"`), its class (`"2XX"`), then `"default"`.
//! Responses without a JSON schema are not checked.

use apispec_core::{Fragment, ValidationErrorRecord, JSON_MEDIA_TYPE};
use apispec_schema::check;
use serde_json::Value;

use crate::error::ContractError;

/// What the response validator needs to see of a response.
pub trait ResponseView {
    fn status(&self) -> u16;
    fn body(&self) -> &[u8];
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl ResponseView for BufferedResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Validates responses against one fragment.
#[derive(Debug, Clone, Copy)]
pub struct ResponseValidator<'a> {
    fragment: &'a Fragment,
}

impl<'a> ResponseValidator<'a> {
    pub fn new(fragment: &'a Fragment) -> Self {
        Self { fragment }
    }

    /// JSON schema declared for `status`, if any.
    pub fn select_schema(&self, status: u16) -> Option<&'a Value> {
        let responses = self.fragment.responses()?;
        let exact = status.to_string();
        let class = format!("{}XX", &exact[..1]);

        let response = responses
            .get(&exact)
            .or_else(|| responses.get(&class))
            .or_else(|| responses.get("default"))?;

        response.get("content")?.get(JSON_MEDIA_TYPE)?.get("schema")
    }

    pub fn validate(&self, response: &impl ResponseView) -> Result<(), ContractError> {
        let Some(schema) = self.select_schema(response.status()) else {
            return Ok(());
        };

        let body: Value = serde_json::from_slice(response.body()).map_err(|e| {
            ContractError::ResponseValidation {
                errors: vec![ValidationErrorRecord::new(format!(
                    "Invalid JSON in response body: {e}"
                ))],
            }
        })?;

        let errors: Vec<ValidationErrorRecord> = check(&body, schema, self.fragment.defs())?
            .into_iter()
            .map(|violation| {
                let details = violation.details();
                ValidationErrorRecord::new(violation.message).with_details(details)
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ContractError::ResponseValidation { errors })
        }
    }
}

//! # Permitted Parameters
//!
//! [`PermittedParams`] gives a handler its query and body parameters
//! filtered through the permit list derived from the action's fragment.
//! An action without a fragment cannot declare what it permits, so the
//! extractor fails with a missing-schema error naming the expected file.
//!
//! Parameters are gathered the way form frameworks usually do: query
//! pairs first, then the body (a JSON object, url-encoded pairs, or the
//! text parts of a multipart body), later values replacing earlier ones.
//! Uploaded files appear under their field name as their file name.

use apispec_contract::{merge_pairs, ContractError, FormValue, ParameterDeriver};
use apispec_core::ActionId;
use axum::body::to_bytes;
use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::state::ContractState;
use crate::wire::{form_fields, query_pairs, BodyKind};

/// Request parameters kept by the action's permit list.
#[derive(Debug, Clone, PartialEq)]
pub struct PermittedParams(pub Map<String, Value>);

impl PermittedParams {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl FromRequest<ContractState> for PermittedParams {
    type Rejection = AppError;

    async fn from_request(request: Request, state: &ContractState) -> Result<Self, Self::Rejection> {
        let id = request
            .extensions()
            .get::<ActionId>()
            .cloned()
            .ok_or_else(|| AppError::Internal("route was not registered with an action".into()))?;

        let fragment = state.resolver().resolve(&id)?.ok_or_else(|| ContractError::MissingSchema {
            expected: state.resolver().store().expected_path(&id),
            id: id.clone(),
        })?;

        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, state.config().body_limit)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut params = Map::new();
        merge_pairs(
            &mut params,
            query_pairs(&parts.uri)
                .into_iter()
                .map(|(name, value)| (name, Value::String(value))),
        );

        match BodyKind::of(&parts.headers) {
            BodyKind::Json if !bytes.is_empty() => {
                let body: Value = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::BadRequest(format!("Invalid JSON in request body: {e}")))?;
                if let Value::Object(body) = body {
                    params.extend(body);
                }
            }
            BodyKind::UrlEncoded | BodyKind::Multipart => {
                let fields = form_fields(&parts.headers, &bytes).await?;
                merge_pairs(
                    &mut params,
                    fields.into_iter().map(|(name, value)| {
                        let value = match value {
                            FormValue::Text(text) => Value::String(text),
                            FormValue::File(meta) => meta.file_name.map(Value::String).unwrap_or(Value::Null),
                        };
                        (name, value)
                    }),
                );
            }
            _ => {}
        }

        let permitted = ParameterDeriver::new(&fragment).permit_list().apply(&params);
        tracing::debug!(action = %id, kept = permitted.len(), received = params.len(), "parameters permitted");
        Ok(Self(permitted))
    }
}

//! # Contract Middleware
//!
//! [`validate_by_schema`] enforces the fragment of the action a route
//! serves. The request is buffered and checked before the handler runs;
//! the handler's response is buffered and checked afterwards. Routes whose
//! action has no fragment pass through untouched.
//!
//! Each failure increments a counter labelled by action:
//!
//! - `apispec_request_validation_failures_total`
//! - `apispec_response_validation_failures_total`

use apispec_contract::{BufferedRequest, BufferedResponse, RequestValidator, ResponseValidator};
use apispec_core::{ActionId, Fragment};
use axum::body::{to_bytes, Body};
use axum::extract::{FromRequestParts, RawPathParams, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::state::ContractState;
use crate::wire::{form_fields, query_pairs};

/// Validate the request and the response of the current action.
pub async fn validate_by_schema(State(state): State<ContractState>, request: Request, next: Next) -> Response {
    match enforce(&state, request, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn enforce(state: &ContractState, request: Request, next: Next) -> Result<Response, AppError> {
    let Some(id) = request.extensions().get::<ActionId>().cloned() else {
        return Ok(next.run(request).await);
    };
    let Some(fragment) = state.resolver().resolve(&id)? else {
        return Ok(next.run(request).await);
    };
    let config = state.config();

    let request = if config.validate_requests {
        check_request(state, &id, &fragment, request).await?
    } else {
        request
    };

    let response = next.run(request).await;

    if config.validate_responses {
        check_response(&id, &fragment, response).await
    } else {
        Ok(response)
    }
}

async fn check_request(
    state: &ContractState,
    id: &ActionId,
    fragment: &Fragment,
    request: Request,
) -> Result<Request, AppError> {
    let (mut parts, body) = request.into_parts();
    let bytes = to_bytes(body, state.config().body_limit)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut view = BufferedRequest::new(bytes.to_vec()).with_query_pairs(query_pairs(&parts.uri));

    if let Ok(params) = RawPathParams::from_request_parts(&mut parts, state).await {
        for (name, value) in &params {
            view = view.with_path_param(name, value);
        }
    }
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            view = view.with_header(name.as_str(), value);
        }
    }
    for cookie in CookieJar::from_headers(&parts.headers).iter() {
        view = view.with_cookie(cookie.name(), cookie.value());
    }
    for (name, value) in form_fields(&parts.headers, &bytes).await? {
        view = view.with_form_field(name, value);
    }

    if let Err(err) = RequestValidator::new(fragment).validate(&mut view) {
        if !err.validation_errors().is_empty() {
            metrics::counter!("apispec_request_validation_failures_total", "action" => id.key())
                .increment(1);
            tracing::debug!(action = %id, error = %err, "request rejected");
        }
        return Err(err.into());
    }

    Ok(Request::from_parts(parts, Body::from(bytes)))
}

async fn check_response(id: &ActionId, fragment: &Fragment, response: Response) -> Result<Response, AppError> {
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let view = BufferedResponse::new(parts.status.as_u16(), bytes.to_vec());
    if let Err(err) = ResponseValidator::new(fragment).validate(&view) {
        metrics::counter!("apispec_response_validation_failures_total", "action" => id.key())
            .increment(1);
        return Err(err.into());
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

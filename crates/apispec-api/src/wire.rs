//! Decoding of query strings and form bodies at the HTTP boundary.

use apispec_contract::{FileMeta, FormValue};
use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Multipart, Query};
use axum::http::{header, HeaderMap, Method, Request, Uri};
use axum::Form;

use crate::error::AppError;

/// How a request body is encoded, by its `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    UrlEncoded,
    Multipart,
    Other,
}

impl BodyKind {
    pub fn of(headers: &HeaderMap) -> Self {
        let Some(content_type) = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        else {
            return Self::Other;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/x-www-form-urlencoded" => Self::UrlEncoded,
            "multipart/form-data" => Self::Multipart,
            e if e == "application/json" || e.ends_with("+json") => Self::Json,
            _ => Self::Other,
        }
    }
}

/// Query string pairs in order; an undecodable query yields none.
pub fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default()
}

/// Decode a url-encoded or multipart body into form fields.
///
/// Other encodings have no form fields.
pub async fn form_fields(headers: &HeaderMap, bytes: &Bytes) -> Result<Vec<(String, FormValue)>, AppError> {
    let kind = BodyKind::of(headers);
    if !matches!(kind, BodyKind::UrlEncoded | BodyKind::Multipart) {
        return Ok(Vec::new());
    }

    let mut builder = Request::builder().method(Method::POST).uri("/");
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder
        .body(Body::from(bytes.clone()))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if kind == BodyKind::UrlEncoded {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok(pairs
            .into_iter()
            .map(|(name, value)| (name, FormValue::Text(value)))
            .collect());
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let value = match file_name {
            Some(file_name) => FormValue::File(FileMeta {
                file_name: Some(file_name),
                content_type,
            }),
            None => FormValue::Text(
                field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?,
            ),
        };
        fields.push((name, value));
    }
    Ok(fields)
}

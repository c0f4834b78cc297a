//! # Request Validation
//!
//! Checks an incoming request against the fragment of the action it is
//! routed to, before the handler runs.
//!
//! Wire data arrives untyped: query strings, path segments, headers and
//! cookies are all text. Before a parameter value is handed to the JSON
//! Schema validator it is coerced by the parameter's classified schema
//! (resolved one level through `$defs`), so `?page=2` satisfies
//! `type: integer`. Text that does not parse as the declared type is left
//! as text and fails validation with the validator's own message.
//!
//! The request body is read through a [`BodyStream`] and rewound on every
//! exit path, so the handler reads the same bytes afterwards.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use apispec_core::{
    Fragment, ParameterDescriptor, ParameterLocation, ScalarKind, SchemaNode,
    ValidationErrorRecord, JSON_MEDIA_TYPE, MULTIPART_MEDIA_TYPE,
};
use apispec_schema::check;
use serde_json::{Map, Number, Value};

use crate::error::ContractError;

/// A readable, rewindable request body.
pub trait BodyStream: Read + Seek {}

impl<T: Read + Seek> BodyStream for T {}

/// A parameter value as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawParam {
    One(String),
    /// Repeated `name[]=` query values.
    Many(Vec<String>),
}

/// Metadata of an uploaded file part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMeta {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// A decoded form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FileMeta),
}

/// What the request validator needs to see of a request.
pub trait RequestView {
    fn query(&self, name: &str) -> Option<RawParam>;
    fn path_param(&self, name: &str) -> Option<String>;
    /// Header lookup; names are case-insensitive.
    fn header(&self, name: &str) -> Option<String>;
    fn cookie(&self, name: &str) -> Option<String>;
    fn body(&mut self) -> &mut dyn BodyStream;
    /// Decoded form fields, in arrival order.
    fn form_fields(&self) -> Vec<(String, FormValue)>;
}

/// Validates requests against one fragment.
#[derive(Debug, Clone, Copy)]
pub struct RequestValidator<'a> {
    fragment: &'a Fragment,
}

impl<'a> RequestValidator<'a> {
    pub fn new(fragment: &'a Fragment) -> Self {
        Self { fragment }
    }

    /// Fail with [`ContractError::RequestValidation`] if any check fails.
    pub fn validate(&self, request: &mut impl RequestView) -> Result<(), ContractError> {
        let errors = self.collect(request)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ContractError::RequestValidation { errors })
        }
    }

    /// Every failure, parameter records before body records.
    ///
    /// An `Err` means the check itself could not run (unreadable body,
    /// uncompilable schema), not that the request is invalid.
    pub fn collect(&self, request: &mut impl RequestView) -> Result<Vec<ValidationErrorRecord>, ContractError> {
        let mut errors = Vec::new();

        if let Some(parameters) = self.fragment.parameters() {
            for (index, parameter) in parameters.iter().enumerate() {
                self.check_parameter(index, parameter, &*request, &mut errors)?;
            }
        }

        if self.fragment.request_body().is_some() {
            self.check_body(request, &mut errors)?;
        }

        Ok(errors)
    }

    fn check_parameter(
        &self,
        index: usize,
        parameter: &ParameterDescriptor,
        request: &impl RequestView,
        errors: &mut Vec<ValidationErrorRecord>,
    ) -> Result<(), ContractError> {
        let name = parameter.name.as_str();
        let location = parameter.location;

        let Some(raw) = extract(request, name, location) else {
            if parameter.is_required() {
                errors.push(ValidationErrorRecord::for_parameter(
                    format!("Missing required {location} parameter: {name}"),
                    name,
                    location,
                ));
            }
            return Ok(());
        };

        let Some(schema) = &parameter.schema else {
            return Ok(());
        };

        let nodes = self.fragment.nodes();
        let value = match nodes.parameter(index) {
            Some(node) => coerce(raw, nodes.resolve(node)),
            None => coerce(raw, &SchemaNode::Scalar(ScalarKind::Untyped)),
        };

        for violation in check(&value, schema, self.fragment.defs())? {
            errors.push(ValidationErrorRecord::for_parameter(
                format!("Invalid {location} parameter '{name}': {}", violation.message),
                name,
                location,
            ));
        }
        Ok(())
    }

    fn check_body(
        &self,
        request: &mut impl RequestView,
        errors: &mut Vec<ValidationErrorRecord>,
    ) -> Result<(), ContractError> {
        if !self.fragment.has_body_content() {
            return Ok(());
        }

        if let Some(schema) = self.fragment.body_schema(JSON_MEDIA_TYPE) {
            let raw = read_rewound(request.body())?;
            let text: &[u8] = if raw.is_empty() { b"{}" } else { &raw };
            match serde_json::from_slice::<Value>(text) {
                Ok(body) => self.check_schema(&body, schema, errors)?,
                Err(e) => errors.push(ValidationErrorRecord::new(format!(
                    "Invalid JSON in request body: {e}"
                ))),
            }
        } else if let Some(schema) = self.fragment.body_schema(MULTIPART_MEDIA_TYPE) {
            let mut fields = Map::new();
            merge_pairs(
                &mut fields,
                request.form_fields().into_iter().map(|(name, value)| {
                    let value = match value {
                        FormValue::Text(text) => Value::String(text),
                        FormValue::File(_) => Value::String(String::new()),
                    };
                    (name, value)
                }),
            );
            self.check_schema(&Value::Object(fields), schema, errors)?;
        }

        Ok(())
    }

    fn check_schema(
        &self,
        instance: &Value,
        schema: &Value,
        errors: &mut Vec<ValidationErrorRecord>,
    ) -> Result<(), ContractError> {
        for violation in check(instance, schema, self.fragment.defs())? {
            errors.push(ValidationErrorRecord::new(violation.message.clone()).with_details(violation.details()));
        }
        Ok(())
    }
}

/// Merge `name=value` pairs into a parameter map.
///
/// `name[]` pairs collect into an array under `name`; otherwise the last
/// value of a repeated name wins.
pub fn merge_pairs(params: &mut Map<String, Value>, pairs: impl IntoIterator<Item = (String, Value)>) {
    for (name, value) in pairs {
        match name.strip_suffix("[]") {
            Some(base) => match params.get_mut(base) {
                Some(Value::Array(items)) => items.push(value),
                _ => {
                    params.insert(base.to_string(), Value::Array(vec![value]));
                }
            },
            None => {
                params.insert(name, value);
            }
        }
    }
}

fn extract(request: &impl RequestView, name: &str, location: ParameterLocation) -> Option<RawParam> {
    match location {
        ParameterLocation::Query => request.query(name),
        ParameterLocation::Path => request.path_param(name).map(RawParam::One),
        ParameterLocation::Header => request.header(name).map(RawParam::One),
        ParameterLocation::Cookie => request.cookie(name).map(RawParam::One),
    }
}

/// Coerce a wire value by its resolved schema node.
///
/// Only single values are converted to scalars; repeated values change
/// shape only under array coercion, and array elements stay text.
pub fn coerce(raw: RawParam, node: &SchemaNode) -> Value {
    let text = match raw {
        RawParam::Many(values) => {
            return Value::Array(values.into_iter().map(Value::String).collect());
        }
        RawParam::One(text) => text,
    };

    match node {
        SchemaNode::Scalar(ScalarKind::Integer) => match text.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => match text.parse::<u64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(text),
            },
        },
        SchemaNode::Scalar(ScalarKind::Number) => match text.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => Value::String(text),
        },
        SchemaNode::Scalar(ScalarKind::Boolean) => match text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text),
        },
        SchemaNode::Array { .. } => Value::Array(vec![Value::String(text)]),
        _ => Value::String(text),
    }
}

fn read_rewound(body: &mut dyn BodyStream) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::new();
    let read = body.read_to_end(&mut raw);
    body.rewind()?;
    read?;
    Ok(raw)
}

/// A fully buffered request.
///
/// Query pairs follow the usual form conventions: `name[]=` pairs collect
/// into [`RawParam::Many`], otherwise the last value of a repeated name wins.
#[derive(Debug, Clone, Default)]
pub struct BufferedRequest {
    query: HashMap<String, RawParam>,
    path: HashMap<String, String>,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    form: Vec<(String, FormValue)>,
    body: Cursor<Vec<u8>>,
}

impl BufferedRequest {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Cursor::new(body.into()),
            ..Self::default()
        }
    }

    pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match key.strip_suffix("[]") {
                Some(base) => match self.query.get_mut(base) {
                    Some(RawParam::Many(values)) => values.push(value),
                    _ => {
                        self.query.insert(base.to_string(), RawParam::Many(vec![value]));
                    }
                },
                None => {
                    self.query.insert(key, RawParam::One(value));
                }
            }
        }
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>, value: FormValue) -> Self {
        self.form.push((name.into(), value));
        self
    }

    /// Query values as received, for building permitted parameters.
    pub fn query_values(&self) -> &HashMap<String, RawParam> {
        &self.query
    }

    pub fn form(&self) -> &[(String, FormValue)] {
        &self.form
    }

    /// Current read position of the body.
    pub fn body_position(&self) -> u64 {
        self.body.position()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body.into_inner()
    }
}

impl RequestView for BufferedRequest {
    fn query(&self, name: &str) -> Option<RawParam> {
        self.query.get(name).cloned()
    }

    fn path_param(&self, name: &str) -> Option<String> {
        self.path.get(name).cloned()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn body(&mut self) -> &mut dyn BodyStream {
        &mut self.body
    }

    fn form_fields(&self) -> Vec<(String, FormValue)> {
        self.form.clone()
    }
}

//! # Integration Tests for apispec-api
//!
//! Runs a small application over a fragment tree in a temporary directory:
//! request rejection before the handler, response breaches after it,
//! pass-through for actions without fragments, permitted parameters, and
//! the documentation routes.

use std::path::Path;

use apispec_api::{ActionRoutes, ApiSpecConfig, PermittedParams};
use apispec_core::ActionId;
use axum::body::Body;
use axum::extract::Path as UrlPath;
use axum::http::{header, Request, StatusCode};
use axum::Json;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn fragments() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let item = r#""Item": {"type": "object", "required": ["id"], "properties": {
        "id": {"type": "integer"}, "name": {"type": "string"}
    }}"#;

    write(
        dir.path(),
        "items/_index.schema.json",
        &format!(
            r##"{{
                "summary": "List items",
                "parameters": [{{"name": "page", "in": "query", "schema": {{"type": "integer"}}}}],
                "responses": {{"200": {{"content": {{"application/json": {{"schema": {{
                    "type": "array", "items": {{"$ref": "#/$defs/Item"}}
                }}}}}}}}}},
                "$defs": {{{item}}}
            }}"##
        ),
    );
    write(
        dir.path(),
        "items/_show.schema.json",
        &format!(
            r##"{{
                "parameters": [{{"name": "id", "in": "path", "required": true, "schema": {{"type": "integer"}}}}],
                "responses": {{"200": {{"content": {{"application/json": {{"schema": {{"$ref": "#/$defs/Item"}}}}}}}}}},
                "$defs": {{{item}}}
            }}"##
        ),
    );
    write(
        dir.path(),
        "items/_create.schema.yml",
        r##"
summary: Create item
requestBody:
  content:
    application/json:
      schema:
        type: object
        required: [name]
        properties:
          name:
            type: string
          address:
            $ref: "#/$defs/Address"
responses:
  201:
    content:
      application/json:
        schema:
          type: object
          required: [id]
$defs:
  Address:
    type: object
    properties:
      city:
        type: string
"##,
    );
    write(
        dir.path(),
        "uploads/_create.schema.json",
        r#"{"requestBody": {"content": {"multipart/form-data": {"schema": {
            "type": "object", "required": ["title"],
            "properties": {"title": {"type": "string"}, "file": {"type": "string", "format": "binary"}}
        }}}}}"#,
    );
    dir
}

async fn index() -> Json<Value> {
    Json(json!([{"id": 1, "name": "widget"}]))
}

async fn show(UrlPath(id): UrlPath<i64>) -> Json<Value> {
    if id == 13 {
        return Json(json!({"id": "thirteen"}));
    }
    Json(json!({"id": id}))
}

async fn create(params: PermittedParams) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({"id": 7, "permitted": params.into_inner()})))
}

async fn upload(params: PermittedParams) -> Json<Value> {
    Json(Value::Object(params.into_inner()))
}

async fn health() -> &'static str {
    "ok"
}

fn id(value: &str) -> ActionId {
    value.parse().unwrap()
}

fn routes() -> ActionRoutes {
    ActionRoutes::new()
        .get("/items", id("items#index"), index)
        .post("/items", id("items#create"), create)
        .get("/items/{id}", id("items#show"), show)
        .post("/uploads", id("uploads#create"), upload)
        .post("/orders", id("orders#create"), create)
        .get("/health", id("health#show"), health)
}

fn test_app(dir: &tempfile::TempDir) -> axum::Router {
    test_app_with(dir, |_| {})
}

fn test_app_with(dir: &tempfile::TempDir, adjust: impl FnOnce(&mut ApiSpecConfig)) -> axum::Router {
    let mut config = ApiSpecConfig {
        roots: vec![dir.path().to_path_buf()],
        ..ApiSpecConfig::default()
    };
    adjust(&mut config);
    apispec_api::app(routes(), config)
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// -- Request validation ---------------------------------------------------------

#[tokio::test]
async fn test_invalid_query_parameter_is_rejected() {
    let dir = fragments();
    let response = test_app(&dir).oneshot(get("/items?page=abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["parameter"], "page");
    assert_eq!(body["error"]["details"][0]["in"], "query");
    assert!(body["error"]["details"][0]["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query parameter 'page':"));
}

#[tokio::test]
async fn test_valid_query_parameter_reaches_handler() {
    let dir = fragments();
    let response = test_app(&dir).oneshot(get("/items?page=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([{"id": 1, "name": "widget"}]));
}

#[tokio::test]
async fn test_body_violation_carries_validator_details() {
    let dir = fragments();
    let response = test_app(&dir)
        .oneshot(post_json("/items", json!({"address": {"city": "Oslo"}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let record = &body["error"]["details"][0];
    assert!(record.get("parameter").is_none());
    assert!(record["details"].get("instancePath").is_some());
    assert!(record["details"].get("schemaPath").is_some());
}

#[tokio::test]
async fn test_malformed_json_is_a_single_record() {
    let dir = fragments();
    let request = Request::builder()
        .method("POST")
        .uri("/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ nope"))
        .unwrap();
    let response = test_app(&dir).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let details = body["error"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert!(details[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON in request body:"));
}

#[tokio::test]
async fn test_request_validation_can_be_disabled() {
    let dir = fragments();
    let app = test_app_with(&dir, |config| config.validate_requests = false);
    let response = app.oneshot(get("/items?page=abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Permitted parameters -------------------------------------------------------

#[tokio::test]
async fn test_handler_sees_only_permitted_parameters() {
    let dir = fragments();
    let response = test_app(&dir)
        .oneshot(post_json(
            "/items",
            json!({"name": "widget", "admin": true, "address": {"city": "Oslo", "zip": "0150"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(
        body["permitted"],
        json!({"name": "widget", "address": {"city": "Oslo"}})
    );
}

#[tokio::test]
async fn test_permitted_parameters_without_fragment_fail() {
    let dir = fragments();
    let response = test_app(&dir)
        .oneshot(post_json("/orders", json!({"total": 3})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MISSING_SCHEMA");
    assert_eq!(body["error"]["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_multipart_upload() {
    let dir = fragments();
    let multipart = |parts: &str| {
        Request::builder()
            .method("POST")
            .uri("/uploads")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body(Body::from(format!("{parts}--XYZ--\r\n")))
            .unwrap()
    };
    let title = "--XYZ\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nQ3 report\r\n";
    let file = "--XYZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"q3.pdf\"\r\n\
                Content-Type: application/pdf\r\n\r\n%PDF-1.4\r\n";

    let response = test_app(&dir).oneshot(multipart(file)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = test_app(&dir)
        .oneshot(multipart(&format!("{title}{file}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"title": "Q3 report", "file": "q3.pdf"})
    );
}

// -- Response validation --------------------------------------------------------

#[tokio::test]
async fn test_conforming_response_passes_through() {
    let dir = fragments();
    let response = test_app(&dir).oneshot(get("/items/5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"id": 5}));
}

#[tokio::test]
async fn test_nonconforming_response_is_replaced() {
    let dir = fragments();
    let response = test_app(&dir).oneshot(get("/items/13")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "RESPONSE_CONTRACT_VIOLATION");
}

#[tokio::test]
async fn test_response_validation_can_be_disabled() {
    let dir = fragments();
    let app = test_app_with(&dir, |config| config.validate_responses = false);
    let response = app.oneshot(get("/items/13")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"id": "thirteen"}));
}

#[tokio::test]
async fn test_action_without_fragment_is_untouched() {
    let dir = fragments();
    let response = test_app(&dir).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

// -- Documentation --------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document() {
    let dir = fragments();
    let app = test_app_with(&dir, |config| {
        config.info = Some(apispec_contract::Info::new("Shop", "2.0.0"));
    });
    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let document = body_json(response).await;
    assert_eq!(document["openapi"], "3.0.3");
    assert_eq!(document["info"]["title"], "Shop");
    assert_eq!(document["paths"]["/items"]["get"]["operationId"], "items#index");
    assert_eq!(document["paths"]["/items"]["post"]["operationId"], "items#create");
    assert_eq!(document["paths"]["/items/{id}"]["get"]["operationId"], "items#show");
    assert_eq!(
        document["paths"]["/items/{id}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Item"
    );
    assert!(document["components"]["schemas"].get("Address").is_some());
    assert!(document["paths"].get("/health").is_none());
}

#[tokio::test]
async fn test_documentation_page() {
    let dir = fragments();
    let app = test_app_with(&dir, |config| config.redoc_js = "/assets/redoc.js".into());
    let response = app.oneshot(get("/openapi")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("<title>API Documentation</title>"));
    assert!(html.contains(r#"<script src="/assets/redoc.js"></script>"#));
}

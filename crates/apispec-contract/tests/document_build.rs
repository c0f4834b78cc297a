//! End-to-end documentation build over a fragment tree and a routing table.

use std::path::Path;

use apispec_contract::{DocumentBuilder, Info, RouteEntry, RouteInspector, RouteTable, Verb};
use apispec_schema::FragmentStore;
use serde_json::json;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn route(controller: &str, action: &str, verb: &str, path: &str) -> RouteEntry {
    RouteEntry {
        controller: controller.into(),
        action: action.into(),
        verb: Verb::Literal(verb.into()),
        path: path.into(),
    }
}

fn routes() -> RouteInspector {
    RouteInspector::new(RouteTable::from_iter([
        route("items", "index", "GET", "/items(.:format)"),
        route("items", "show", "GET", "/items/:id(.:format)"),
        route("items", "update", "PATCH", "/items/:id(.:format)"),
    ]))
}

#[test]
fn two_fragments_merge_components_and_rewrite_refs() {
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "items/_index.schema.json",
        r##"{
            "summary": "List items",
            "responses": {"200": {"content": {"application/json": {"schema": {
                "type": "array", "items": {"$ref": "#/$defs/Item"}
            }}}}},
            "$defs": {"Item": {"type": "object", "properties": {"id": {"type": "integer"}}}}
        }"##,
    );
    write(
        root.path(),
        "items/_show.schema.yml",
        r##"
summary: Show item
parameters:
  - name: id
    in: path
    required: true
    schema:
      $ref: "#/$defs/Id"
responses:
  200:
    content:
      application/json:
        schema:
          $ref: "#/$defs/Item"
$defs:
  Id:
    type: integer
  Item:
    type: object
    properties:
      id:
        type: integer
"##,
    );
    write(root.path(), "orders/_index.schema.json", r#"{"summary": "no route"}"#);

    let store = FragmentStore::new([root.path()]);
    let inspector = routes();
    let document = DocumentBuilder::new(&store, &inspector).build().unwrap();
    let value = document.to_value().unwrap();

    assert_eq!(value["openapi"], "3.0.3");
    assert_eq!(value["info"], json!({"title": "API Documentation", "version": "1.0.0"}));

    let paths = value["paths"].as_object().unwrap();
    let templates: Vec<&String> = paths.keys().collect();
    assert_eq!(templates, ["/items", "/items/{id}"]);

    assert_eq!(value["paths"]["/items"]["get"]["operationId"], "items#index");
    assert_eq!(
        value["paths"]["/items"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["items"]["$ref"],
        "#/components/schemas/Item"
    );
    assert_eq!(
        value["paths"]["/items/{id}"]["get"]["parameters"][0]["schema"]["$ref"],
        "#/components/schemas/Id"
    );

    let schemas = value["components"]["schemas"].as_object().unwrap();
    assert!(schemas.contains_key("Item"));
    assert!(schemas.contains_key("Id"));
    assert!(document.diagnostics().is_empty());
    assert!(!document.to_json_pretty().unwrap().contains("#/$defs/"));
}

#[test]
fn references_between_definitions_are_rewritten() {
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "items/_show.schema.json",
        r##"{
            "responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/$defs/Order"}}}}},
            "$defs": {
                "Order": {"type": "object", "properties": {
                    "items": {"type": "array", "items": {"$ref": "#/$defs/Line"}}
                }},
                "Line": {"type": "object", "properties": {"sku": {"type": "string"}}}
            }
        }"##,
    );

    let store = FragmentStore::new([root.path()]);
    let inspector = routes();
    let document = DocumentBuilder::new(&store, &inspector).build().unwrap();

    let schemas = &document.components.as_ref().unwrap().schemas;
    assert_eq!(
        schemas["Order"]["properties"]["items"]["items"]["$ref"],
        "#/components/schemas/Line"
    );
    assert!(schemas.contains_key("Line"));
    assert!(!document.to_json_pretty().unwrap().contains("#/$defs/"));
}

#[test]
fn conflicting_definitions_are_reported() {
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "items/_index.schema.json",
        r#"{"$defs": {"Item": {"type": "object"}}}"#,
    );
    write(
        root.path(),
        "items/_show.schema.json",
        r#"{"$defs": {"Item": {"type": "string"}}}"#,
    );

    let store = FragmentStore::new([root.path()]);
    let inspector = routes();
    let document = DocumentBuilder::new(&store, &inspector)
        .info(Info::new("Inventory", "2.1.0"))
        .build()
        .unwrap();

    assert_eq!(document.info.title, "Inventory");
    assert_eq!(document.diagnostics().len(), 1);
    assert_eq!(document.diagnostics()[0].name, "Item");
    assert_eq!(document.diagnostics()[0].action.key(), "items#show");
    assert_eq!(
        document.components.as_ref().unwrap().schemas["Item"],
        json!({"type": "string"})
    );
}

#[test]
fn no_definitions_means_no_components() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "items/_update.schema.json", r#"{"summary": "Update"}"#);

    let store = FragmentStore::new([root.path()]);
    let inspector = routes();
    let document = DocumentBuilder::new(&store, &inspector).build().unwrap();

    assert!(document.components.is_none());
    assert!(document.to_value().unwrap().get("components").is_none());
    assert_eq!(
        document.operation("/items/{id}", "patch").unwrap()["summary"],
        "Update"
    );
}

#[test]
fn parse_errors_abort_the_build() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "items/_index.schema.json", "{ not json");

    let store = FragmentStore::new([root.path()]);
    let inspector = routes();
    assert!(DocumentBuilder::new(&store, &inspector).build().is_err());
}

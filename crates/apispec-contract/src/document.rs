//! # Document Builder
//!
//! Merges every routed fragment into one OpenAPI 3.0.3 document.
//!
//! For each fragment found by [`FragmentStore::find_all`] whose action has
//! a route, the builder:
//!
//! 1. parses the fragment (a parse error aborts the whole build),
//! 2. merges its `$defs` into `components.schemas` with references between
//!    definitions rewritten (a later definition replaces an earlier one of
//!    the same name),
//! 3. builds the operation (`operationId` is the action key), rewriting
//!    `#/$defs/` references to `#/components/schemas/`,
//! 4. files it under `paths[template][method]`.
//!
//! Fragments without a route are skipped.

use apispec_core::{rewrite_local_refs, ActionId, Definitions, Fragment};
use apispec_schema::{load_fragment, FragmentStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ContractError;
use crate::routes::RouteInspector;

/// OpenAPI version of every built document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Document `info` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    /// Any other `info` keys (`description`, `contact`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            extra: Map::new(),
        }
    }
}

impl Default for Info {
    fn default() -> Self {
        Self::new("API Documentation", "1.0.0")
    }
}

/// `components` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Components {
    pub schemas: Definitions,
}

/// A `$defs` name defined differently by two fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionCollision {
    /// Definition name.
    pub name: String,
    /// Action whose definition replaced the earlier one.
    pub action: ActionId,
}

/// The merged document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateDocument {
    pub openapi: String,
    pub info: Info,
    /// Path template to method to operation.
    pub paths: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(skip)]
    diagnostics: Vec<DefinitionCollision>,
}

impl AggregateDocument {
    /// Collisions seen while merging definitions.
    pub fn diagnostics(&self) -> &[DefinitionCollision] {
        &self.diagnostics
    }

    pub fn operation(&self, path: &str, method: &str) -> Option<&Value> {
        self.paths.get(path)?.get(method)
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds an [`AggregateDocument`] from a store and a routing table.
#[derive(Debug, Clone)]
pub struct DocumentBuilder<'a> {
    store: &'a FragmentStore,
    routes: &'a RouteInspector,
    info: Option<Info>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(store: &'a FragmentStore, routes: &'a RouteInspector) -> Self {
        Self {
            store,
            routes,
            info: None,
        }
    }

    /// Override the default `info`.
    pub fn info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self
    }

    pub fn build(&self) -> Result<AggregateDocument, ContractError> {
        let mut paths = Map::new();
        let mut schemas = Definitions::new();
        let mut diagnostics = Vec::new();

        for entry in self.store.find_all() {
            let Some(route) = self.routes.find_route(&entry.id) else {
                debug!(action = %entry.id, "fragment has no route, skipped");
                continue;
            };

            let Some(fragment) = load_fragment(&entry.path)? else {
                continue;
            };

            for (name, definition) in fragment.defs() {
                let definition = rewrite_local_refs(definition);
                if let Some(previous) = schemas.get(name) {
                    if *previous != definition {
                        warn!(
                            definition = %name,
                            action = %entry.id,
                            "conflicting $defs entry, later definition wins"
                        );
                        diagnostics.push(DefinitionCollision {
                            name: name.clone(),
                            action: entry.id.clone(),
                        });
                    }
                }
                schemas.insert(name.clone(), definition);
            }

            let operation = build_operation(&fragment, &entry.id);
            let methods = paths
                .entry(route.path)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(methods) = methods {
                methods.insert(route.method, operation);
            }
        }

        Ok(AggregateDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info.clone().unwrap_or_default(),
            paths,
            components: (!schemas.is_empty()).then_some(Components { schemas }),
            diagnostics,
        })
    }
}

/// The operation object for one fragment, with local references rewritten.
pub fn build_operation(fragment: &Fragment, id: &ActionId) -> Value {
    let mut operation = Map::new();
    operation.insert("operationId".into(), Value::String(id.key()));
    if let Some(summary) = fragment.summary() {
        operation.insert("summary".into(), Value::String(summary.to_string()));
    }
    if let Some(description) = fragment.description() {
        operation.insert("description".into(), Value::String(description.to_string()));
    }
    if let Some(parameters) = fragment.parameters() {
        operation.insert(
            "parameters".into(),
            Value::Array(parameters.iter().map(|p| p.to_value()).collect()),
        );
    }
    if let Some(body) = fragment.request_body() {
        operation.insert("requestBody".into(), body.clone());
    }
    if let Some(responses) = fragment.responses() {
        operation.insert("responses".into(), Value::Object(responses.clone()));
    }
    if let Some(tags) = fragment.tags() {
        operation.insert("tags".into(), Value::from(tags.to_vec()));
    }
    rewrite_local_refs(&Value::Object(operation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operation_key_order_and_rewrite() {
        let fragment = Fragment::from_value(json!({
            "tags": ["items"],
            "responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/$defs/Item"}}}}},
            "summary": "Show",
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"$ref": "#/$defs/Id"}}],
            "$defs": {"Item": {"type": "object"}, "Id": {"type": "integer"}}
        }))
        .unwrap();
        let id = ActionId::new("items", "show").unwrap();

        let operation = build_operation(&fragment, &id);
        let keys: Vec<&String> = operation.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["operationId", "summary", "parameters", "responses", "tags"]);
        assert_eq!(operation["operationId"], "items#show");
        assert_eq!(operation["parameters"][0]["schema"]["$ref"], "#/components/schemas/Id");
        assert_eq!(
            operation["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Item"
        );
    }

    #[test]
    fn default_info() {
        let info = Info::default();
        assert_eq!(info.title, "API Documentation");
        assert_eq!(info.version, "1.0.0");
        assert_eq!(serde_json::to_value(&info).unwrap(), json!({"title": "API Documentation", "version": "1.0.0"}));
    }
}

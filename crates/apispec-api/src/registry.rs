//! # Action Routes
//!
//! Registers handlers under an [`ActionId`] so the contract layer knows
//! which fragment governs each route. Registration produces both halves
//! the contract layer needs: an axum [`Router`] and the [`RouteTable`]
//! the document builder reads.
//!
//! Each registered method router is wrapped, outermost first, in an
//! [`Extension`] carrying the action identity and the
//! [`validate_by_schema`](crate::middleware::validate_by_schema)
//! middleware, so both the middleware and the handler's extractors see
//! which action they serve.

use apispec_contract::{RouteEntry, RouteTable, Verb};
use apispec_core::ActionId;
use axum::handler::Handler;
use axum::middleware::from_fn_with_state;
use axum::routing::{self, MethodRouter};
use axum::{Extension, Router};

use crate::middleware::validate_by_schema;
use crate::state::ContractState;

struct Registered {
    path: String,
    id: ActionId,
    method_router: MethodRouter<ContractState>,
}

/// Handlers keyed by action identity.
#[derive(Default)]
pub struct ActionRoutes {
    routes: Vec<Registered>,
    table: RouteTable,
}

macro_rules! verb_method {
    ($name:ident, $verb:literal) => {
        #[doc = concat!("Register `handler` for `", $verb, " path` as action `id`.")]
        pub fn $name<H, T>(self, path: &str, id: ActionId, handler: H) -> Self
        where
            H: Handler<T, ContractState>,
            T: 'static,
        {
            self.register(path, $verb, id, routing::$name(handler))
        }
    };
}

impl ActionRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    verb_method!(get, "GET");
    verb_method!(post, "POST");
    verb_method!(put, "PUT");
    verb_method!(patch, "PATCH");
    verb_method!(delete, "DELETE");

    fn register(
        mut self,
        path: &str,
        verb: &str,
        id: ActionId,
        method_router: MethodRouter<ContractState>,
    ) -> Self {
        self.table.push(RouteEntry {
            controller: id.namespace().to_string(),
            action: id.action().to_string(),
            verb: Verb::Literal(verb.to_string()),
            path: path.replace("{*", "{"),
        });
        self.routes.push(Registered {
            path: path.to_string(),
            id,
            method_router,
        });
        self
    }

    /// Routing table of everything registered so far.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The router, with every route wrapped in the contract middleware.
    pub fn into_router(self, state: &ContractState) -> Router<ContractState> {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, registered| {
                let validated: MethodRouter<ContractState> = registered
                    .method_router
                    .layer(from_fn_with_state(state.clone(), validate_by_schema));
                router.route(&registered.path, validated.layer(Extension(registered.id)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apispec_contract::RouteInspector;

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn table_mirrors_registration() {
        let routes = ActionRoutes::new()
            .get("/items", ActionId::parse("items#index").unwrap(), ok)
            .patch("/items/{id}", ActionId::parse("items#update").unwrap(), ok)
            .get("/files/{*path}", ActionId::parse("files#show").unwrap(), ok);

        let inspector = RouteInspector::new(routes.table().clone());
        let update = inspector.find_route(&ActionId::parse("items#update").unwrap()).unwrap();
        assert_eq!(update.path, "/items/{id}");
        assert_eq!(update.method, "patch");

        let files = inspector.find_route(&ActionId::parse("files#show").unwrap()).unwrap();
        assert_eq!(files.path, "/files/{path}");
        assert_eq!(routes.table().len(), 3);
    }

    #[test]
    fn namespaced_controllers() {
        let routes = ActionRoutes::new().post(
            "/admin/users",
            ActionId::parse("admin/users#create").unwrap(),
            ok,
        );
        let entry = &routes.table().entries()[0];
        assert_eq!(entry.controller, "admin/users");
        assert_eq!(entry.action, "create");
    }
}

//! # apispec-api — Axum Integration
//!
//! Wires the contract layer into an axum application:
//!
//! - [`registry`]: register handlers by action identity.
//! - [`middleware`]: request and response validation around each handler.
//! - [`extractors`]: [`PermittedParams`], the allow-listed parameters.
//! - [`docs`]: `/openapi.json` and the `/openapi` ReDoc page.
//! - [`config`]: roots, toggles and limits, from YAML and the environment.
//!
//! ```ignore
//! let routes = ActionRoutes::new()
//!     .get("/items", "items#index".parse()?, list_items)
//!     .post("/items", "items#create".parse()?, create_item);
//! let app = apispec_api::app(routes, ApiSpecConfig::from_env()?);
//! ```

pub mod config;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod registry;
pub mod state;
mod wire;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{ApiSpecConfig, ConfigError};
pub use error::AppError;
pub use extractors::PermittedParams;
pub use middleware::validate_by_schema;
pub use registry::ActionRoutes;
pub use state::ContractState;

/// Build the application router.
///
/// Every registered route is validated against its action's fragment; the
/// documentation routes are not.
pub fn app(routes: ActionRoutes, config: ApiSpecConfig) -> Router {
    let body_limit = config.body_limit;
    let state = ContractState::new(config, routes.table().clone());

    routes
        .into_router(&state)
        .merge(docs::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

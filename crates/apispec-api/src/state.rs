//! Shared state of the contract layer.

use std::sync::Arc;

use apispec_contract::{AggregateDocument, ContractError, DocumentBuilder, RouteInspector, RouteTable};
use apispec_schema::SchemaResolver;

use crate::config::ApiSpecConfig;

/// Configuration, fragment resolver and route table, shared by every
/// request. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ContractState {
    config: Arc<ApiSpecConfig>,
    resolver: Arc<SchemaResolver>,
    routes: Arc<RouteInspector>,
}

impl ContractState {
    pub fn new(config: ApiSpecConfig, routes: RouteTable) -> Self {
        let resolver = SchemaResolver::new(config.store());
        Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            routes: Arc::new(RouteInspector::new(routes)),
        }
    }

    pub fn config(&self) -> &ApiSpecConfig {
        &self.config
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    pub fn routes(&self) -> &RouteInspector {
        &self.routes
    }

    /// Build the aggregate document from the current fragment files.
    pub fn document(&self) -> Result<AggregateDocument, ContractError> {
        DocumentBuilder::new(self.resolver.store(), &self.routes)
            .info(self.config.info_or_default())
            .build()
    }
}

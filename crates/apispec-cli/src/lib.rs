//! # apispec-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `apispec doc`: Build the aggregate OpenAPI document from a route table.
//! - `apispec check`: Parse every fragment and compile every schema in it.
//! - `apispec params`: Print the permit list derived for one action.
//!
//! ```bash
//! apispec --root app/views doc --routes routes.yml --output openapi.json
//! apispec --config apispec.yml check
//! apispec params admin/users#create
//! ```
//!
//! Handlers return the process exit code; argument parsing stays in
//! `main.rs`.

pub mod check;
pub mod doc;
pub mod params;
pub mod routes;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use apispec_api::ApiSpecConfig;

/// Configuration from `--config` (or defaults), the environment, then
/// any `--root` flags, in increasing precedence.
pub fn load_config(config: Option<&Path>, roots: &[PathBuf]) -> Result<ApiSpecConfig> {
    let config = match config {
        Some(path) => ApiSpecConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ApiSpecConfig::default(),
    };
    let mut config = config.apply_env().context("invalid environment configuration")?;
    if !roots.is_empty() {
        config.roots = roots.to_vec();
    }
    Ok(config)
}

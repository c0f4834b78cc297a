//! # Doc Subcommand
//!
//! Builds the aggregate OpenAPI document from the configured fragment roots
//! and a route table file, and writes it as pretty-printed JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use apispec_api::ApiSpecConfig;
use apispec_contract::{DocumentBuilder, RouteInspector};
use clap::Args;

use crate::routes::load_route_table;

/// Arguments for the doc subcommand.
#[derive(Args, Debug)]
pub struct DocArgs {
    /// Route table file (YAML or JSON).
    #[arg(long)]
    pub routes: PathBuf,

    /// Write the document here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Override `info.title`.
    #[arg(long)]
    pub title: Option<String>,

    /// Override `info.version`.
    #[arg(long = "api-version")]
    pub api_version: Option<String>,
}

/// Execute the doc subcommand.
pub fn run_doc(args: &DocArgs, config: &ApiSpecConfig) -> Result<u8> {
    let json = render_document(args, config)?;
    match &args.output {
        Some(path) => {
            write_output(path, &json)?;
            tracing::info!(path = %path.display(), "wrote OpenAPI document");
        }
        None => println!("{json}"),
    }
    Ok(0)
}

/// The document as pretty-printed JSON.
pub fn render_document(args: &DocArgs, config: &ApiSpecConfig) -> Result<String> {
    let routes = RouteInspector::new(load_route_table(&args.routes)?);
    let store = config.store();

    let mut info = config.info_or_default();
    if let Some(title) = &args.title {
        info.title = title.clone();
    }
    if let Some(version) = &args.api_version {
        info.version = version.clone();
    }

    let document = DocumentBuilder::new(&store, &routes)
        .info(info)
        .build()
        .context("failed to build OpenAPI document")?;

    tracing::debug!(collisions = document.diagnostics().len(), "document built");

    document
        .to_json_pretty()
        .context("failed to serialize OpenAPI document")
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("failed to write document: {}", path.display()))
}

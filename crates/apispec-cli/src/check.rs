//! # Check Subcommand
//!
//! Loads every fragment under the configured roots and compiles every
//! schema it contains (parameter schemas, request body schemas, response
//! schemas) with the fragment's `$defs` in scope. Exits 1 if any fragment
//! fails.

use std::path::PathBuf;

use anyhow::Result;
use apispec_api::ApiSpecConfig;
use apispec_core::{ActionId, Fragment};
use apispec_schema::{compile, load_fragment, FragmentStore};
use clap::Args;
use serde_json::Value;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print every checked fragment, not just failures.
    #[arg(long)]
    pub list: bool,
}

/// One fragment that did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub id: ActionId,
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of checking a fragment tree.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub checked: Vec<ActionId>,
    pub failures: Vec<CheckFailure>,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, config: &ApiSpecConfig) -> Result<u8> {
    let report = check_store(&config.store());

    if args.list {
        for id in &report.checked {
            println!("  ok    {id}");
        }
    }
    for failure in &report.failures {
        println!("  FAIL  {} ({}): {}", failure.id, failure.path.display(), failure.reason);
    }
    println!(
        "{} fragments checked, {} failed",
        report.checked.len() + report.failures.len(),
        report.failures.len()
    );

    Ok(if report.failures.is_empty() { 0 } else { 1 })
}

/// Check every fragment in `store`.
pub fn check_store(store: &FragmentStore) -> CheckReport {
    let mut report = CheckReport::default();
    for entry in store.find_all() {
        let outcome = match load_fragment(&entry.path) {
            Ok(Some(fragment)) => check_fragment(&fragment),
            Ok(None) => continue,
            Err(e) => Err(e.to_string()),
        };
        match outcome {
            Ok(()) => report.checked.push(entry.id),
            Err(reason) => report.failures.push(CheckFailure {
                id: entry.id,
                path: entry.path,
                reason,
            }),
        }
    }
    report
}

fn check_fragment(fragment: &Fragment) -> Result<(), String> {
    for (location, schema) in fragment_schemas(fragment) {
        compile(schema, fragment.defs()).map_err(|e| format!("{location}: {e}"))?;
    }
    Ok(())
}

/// Every schema of a fragment, labelled by where it sits.
fn fragment_schemas(fragment: &Fragment) -> Vec<(String, &Value)> {
    let mut schemas = Vec::new();

    for parameter in fragment.parameters().unwrap_or_default() {
        if let Some(schema) = &parameter.schema {
            schemas.push((format!("parameter {} in {}", parameter.name, parameter.location), schema));
        }
    }

    if let Some(content) = fragment
        .request_body()
        .and_then(|body| body.get("content"))
        .and_then(Value::as_object)
    {
        for (media_type, media) in content {
            if let Some(schema) = media.get("schema") {
                schemas.push((format!("requestBody {media_type}"), schema));
            }
        }
    }

    for (status, response) in fragment.responses().into_iter().flatten() {
        let Some(content) = response.get("content").and_then(Value::as_object) else {
            continue;
        };
        for (media_type, media) in content {
            if let Some(schema) = media.get("schema") {
                schemas.push((format!("response {status} {media_type}"), schema));
            }
        }
    }

    schemas
}

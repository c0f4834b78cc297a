//! Route table files.
//!
//! A YAML (or JSON) list of routes as the web framework reports them:
//!
//! ```yaml
//! - controller: items
//!   action: show
//!   verb: GET
//!   path: /items/:id(.:format)
//! - controller: items
//!   action: update
//!   verb_pattern: ^PATCH$
//!   path: /items/:id(.:format)
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use apispec_contract::{RouteEntry, RouteTable, Verb};
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RouteRecord {
    controller: String,
    action: String,
    #[serde(default)]
    verb: Option<String>,
    #[serde(default)]
    verb_pattern: Option<String>,
    path: String,
}

impl RouteRecord {
    fn into_entry(self) -> Result<RouteEntry> {
        let verb = match (self.verb, self.verb_pattern) {
            (Some(verb), _) => Verb::Literal(verb),
            (None, Some(pattern)) => Verb::Pattern(
                Regex::new(&pattern).with_context(|| format!("invalid verb pattern {pattern:?}"))?,
            ),
            (None, None) => Verb::Absent,
        };
        Ok(RouteEntry {
            controller: self.controller,
            action: self.action,
            verb,
            path: self.path,
        })
    }
}

/// Parse a route table document.
pub fn parse_route_table(content: &str) -> Result<RouteTable> {
    let records: Vec<RouteRecord> = serde_yaml::from_str(content).context("invalid route table")?;
    records.into_iter().map(RouteRecord::into_entry).collect()
}

/// Read and parse a route table file.
pub fn load_route_table(path: &Path) -> Result<RouteTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route table {}", path.display()))?;
    parse_route_table(&content).with_context(|| format!("in {}", path.display()))
}

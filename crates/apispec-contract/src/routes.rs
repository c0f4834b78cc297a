//! # Route Inspector
//!
//! Maps an action to the path template and HTTP method it is routed under.
//! The routing table is handed in as plain values; whichever framework
//! owns the router produces the [`RouteTable`].
//!
//! Templates are normalized to OpenAPI form: optional format groups such
//! as `(.:format)` are dropped, `:id` becomes `{id}`, and a trailing slash
//! is removed from anything but the root path.

use std::sync::OnceLock;

use apispec_core::ActionId;
use regex::Regex;
use serde::Serialize;

/// HTTP verb constraint of a route.
#[derive(Debug, Clone)]
pub enum Verb {
    /// A single verb, e.g. `GET`.
    Literal(String),
    /// A verb pattern such as `^GET$`.
    Pattern(Regex),
    /// No verb constraint recorded.
    Absent,
}

impl Verb {
    /// Lowercase method name, or `None` when nothing usable remains.
    pub fn method(&self) -> Option<String> {
        let method = match self {
            Self::Literal(verb) => verb.to_lowercase(),
            Self::Pattern(pattern) => pattern.as_str().replace(['^', '$'], "").to_lowercase(),
            Self::Absent => return None,
        };
        (!method.is_empty()).then_some(method)
    }
}

/// One routing-table row.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Controller namespace the route dispatches to.
    pub controller: String,
    /// Action name.
    pub action: String,
    pub verb: Verb,
    /// Raw path template, e.g. `/items/:id(.:format)`.
    pub path: String,
}

/// Ordered routing table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RouteEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RouteEntry> for RouteTable {
    fn from_iter<T: IntoIterator<Item = RouteEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Where an action is routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// OpenAPI path template.
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
}

/// Looks actions up in a routing table.
#[derive(Debug, Clone)]
pub struct RouteInspector {
    table: RouteTable,
}

impl RouteInspector {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Route of the first entry dispatching to `id`.
    ///
    /// `None` when no entry matches or the matching entry has no usable
    /// verb. Later entries for the same action are not consulted.
    pub fn find_route(&self, id: &ActionId) -> Option<RouteMatch> {
        let entry = self
            .table
            .entries
            .iter()
            .find(|e| e.controller == id.namespace() && e.action == id.action())?;

        let path = normalize_path(&entry.path);
        let method = entry.verb.method()?;
        Some(RouteMatch { path, method })
    }
}

fn optional_group() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\.?:?\w+\)").expect("Invalid regex constant"))
}

fn named_segment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":(\w+)").expect("Invalid regex constant"))
}

/// Convert a router path template to an OpenAPI path template.
pub fn normalize_path(template: &str) -> String {
    let without_groups = optional_group().replace_all(template, "");
    let mut path = named_segment()
        .replace_all(&without_groups, "{$1}")
        .into_owned();
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

//! # Action Identity
//!
//! An action is addressed by its controller namespace (a `/`-separated
//! path such as `admin/items`) and its action name (`index`, `show`, ...).
//!
//! ## Security Invariant
//!
//! The namespace is joined onto fragment root directories to locate files.
//! The constructor rejects empty, `.` and `..` segments as well as leading
//! or trailing separators, so an identity can never address a file outside
//! its root.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Separator between namespace and action in the textual form.
const SEPARATOR: char = '#';

/// Identity of one controller action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionId {
    namespace: String,
    action: String,
}

impl ActionId {
    /// Build an identity from its two parts.
    pub fn new(namespace: impl Into<String>, action: impl Into<String>) -> Result<Self, CoreError> {
        let namespace = namespace.into();
        let action = action.into();
        let value = format!("{namespace}{SEPARATOR}{action}");

        let reject = |reason| CoreError::InvalidActionId {
            value: value.clone(),
            reason,
        };

        if namespace.is_empty() {
            return Err(reject("namespace is empty"));
        }
        if action.is_empty() {
            return Err(reject("action is empty"));
        }
        if namespace.contains(SEPARATOR) || action.contains(SEPARATOR) {
            return Err(reject("'#' is reserved as the separator"));
        }
        if action.contains('/') || action.contains('\\') {
            return Err(reject("action must not contain a path separator"));
        }
        if namespace.contains('\\') {
            return Err(reject("namespace segments are separated by '/'"));
        }
        if namespace
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(reject("namespace contains an empty or relative segment"));
        }

        Ok(Self { namespace, action })
    }

    /// Parse the textual `namespace#action` form.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.split_once(SEPARATOR) {
            Some((namespace, action)) => Self::new(namespace, action),
            None => Err(CoreError::InvalidActionId {
                value: value.to_string(),
                reason: "expected 'namespace#action'",
            }),
        }
    }

    /// Controller namespace, e.g. `admin/items`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Action name, e.g. `show`.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Cache key and `operationId` form: `namespace#action`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.namespace, self.action)
    }
}

impl FromStr for ActionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ActionId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ActionId> for String {
    fn from(id: ActionId) -> Self {
        id.to_string()
    }
}

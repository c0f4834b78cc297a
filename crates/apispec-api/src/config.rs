//! # Configuration
//!
//! [`ApiSpecConfig`] is read from a YAML file, the environment, or both
//! (file first, then environment overrides). Every field has a default, so
//! an empty file or an empty environment yields a working configuration.
//!
//! | Variable                     | Field                |
//! |------------------------------|----------------------|
//! | `APISPEC_ROOTS`              | `roots` (path list)  |
//! | `APISPEC_VALIDATE_REQUESTS`  | `validate_requests`  |
//! | `APISPEC_VALIDATE_RESPONSES` | `validate_responses` |
//! | `APISPEC_REDOC_JS`           | `redoc_js`           |

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use apispec_contract::Info;
use apispec_schema::FragmentStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default script source of the ReDoc page.
pub const DEFAULT_REDOC_JS: &str = "https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js";

/// Default request body limit: 2 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {var}: {value:?} (expected true or false)")]
    InvalidEnv { var: &'static str, value: String },
}

/// Runtime configuration of the contract layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSpecConfig {
    /// Fragment roots, searched in order.
    pub roots: Vec<PathBuf>,
    /// `info` of the aggregate document.
    pub info: Option<Info>,
    pub validate_requests: bool,
    pub validate_responses: bool,
    /// Largest request body buffered for validation, in bytes.
    pub body_limit: usize,
    /// Script source of the ReDoc page.
    pub redoc_js: String,
}

impl Default for ApiSpecConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from("app/views")],
            info: None,
            validate_requests: true,
            validate_responses: true,
            body_limit: DEFAULT_BODY_LIMIT,
            redoc_js: DEFAULT_REDOC_JS.to_string(),
        }
    }
}

impl ApiSpecConfig {
    /// Load a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Override fields from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|name| std::env::var_os(name))
    }

    /// Override fields from `lookup`, which maps a variable name to its value.
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self, ConfigError> {
        if let Some(roots) = lookup("APISPEC_ROOTS") {
            self.roots = std::env::split_paths(&roots).collect();
        }
        if let Some(value) = lookup("APISPEC_VALIDATE_REQUESTS") {
            self.validate_requests = parse_flag("APISPEC_VALIDATE_REQUESTS", value)?;
        }
        if let Some(value) = lookup("APISPEC_VALIDATE_RESPONSES") {
            self.validate_responses = parse_flag("APISPEC_VALIDATE_RESPONSES", value)?;
        }
        if let Some(value) = lookup("APISPEC_REDOC_JS") {
            self.redoc_js = value.to_string_lossy().into_owned();
        }
        Ok(self)
    }

    /// A fragment store over the configured roots.
    pub fn store(&self) -> FragmentStore {
        FragmentStore::new(self.roots.iter().cloned())
    }

    pub fn info_or_default(&self) -> Info {
        self.info.clone().unwrap_or_default()
    }
}

fn parse_flag(var: &'static str, value: OsString) -> Result<bool, ConfigError> {
    let value = value.to_string_lossy();
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: value.into_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = ApiSpecConfig::default();
        assert_eq!(config.roots, vec![PathBuf::from("app/views")]);
        assert!(config.validate_requests);
        assert!(config.validate_responses);
        assert_eq!(config.body_limit, 2 * 1024 * 1024);
        assert_eq!(config.redoc_js, DEFAULT_REDOC_JS);
        assert_eq!(config.info_or_default(), Info::default());
    }

    #[test]
    fn file_overrides_only_what_it_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apispec.yml");
        std::fs::write(
            &path,
            "roots: [app/views, engines/billing/app/views]\nvalidate_responses: false\ninfo:\n  title: Shop\n  version: 2.0.0\n  description: Storefront\n",
        )
        .unwrap();

        let config = ApiSpecConfig::from_file(&path).unwrap();
        assert_eq!(config.roots.len(), 2);
        assert!(config.validate_requests);
        assert!(!config.validate_responses);
        let info = config.info.unwrap();
        assert_eq!(info.title, "Shop");
        assert_eq!(info.extra["description"], "Storefront");
    }

    #[test]
    fn empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apispec.yml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(ApiSpecConfig::from_file(&path).unwrap(), ApiSpecConfig::default());
    }

    #[test]
    fn bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apispec.yml");
        std::fs::write(&path, "validate_requests: [nope").unwrap();
        let err = ApiSpecConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("apispec.yml"));
    }

    #[test]
    fn environment_overrides() {
        let config = ApiSpecConfig::default()
            .apply_env_from(env(&[
                ("APISPEC_VALIDATE_REQUESTS", "false"),
                ("APISPEC_VALIDATE_RESPONSES", "1"),
                ("APISPEC_REDOC_JS", "/assets/redoc.js"),
                ("APISPEC_ROOTS", "schemas"),
            ]))
            .unwrap();
        assert!(!config.validate_requests);
        assert!(config.validate_responses);
        assert_eq!(config.redoc_js, "/assets/redoc.js");
        assert_eq!(config.roots, vec![PathBuf::from("schemas")]);
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let err = ApiSpecConfig::default()
            .apply_env_from(env(&[("APISPEC_VALIDATE_REQUESTS", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "APISPEC_VALIDATE_REQUESTS", .. }));
    }
}

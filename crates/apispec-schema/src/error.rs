use std::path::PathBuf;

use apispec_core::CoreError;
use thiserror::Error;

/// Error loading a fragment or compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The fragment file could not be read.
    #[error("cannot read fragment '{}': {source}", .path.display())]
    Io {
        /// Fragment path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The fragment file is not valid JSON or YAML.
    #[error("cannot parse fragment '{}': {reason}", .path.display())]
    Parse {
        /// Fragment path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The document parsed but does not have the fragment shape.
    #[error("invalid fragment '{}': {source}", .path.display())]
    Decode {
        /// Fragment path.
        path: PathBuf,
        /// Decoding failure.
        #[source]
        source: CoreError,
    },

    /// A schema could not be compiled by the JSON Schema validator.
    #[error("schema compile error: {reason}")]
    Compile {
        /// Validator message.
        reason: String,
    },
}

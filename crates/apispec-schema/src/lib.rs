//! # apispec-schema — Fragment Storage and Validation Glue
//!
//! - [`store`]: locates fragment files across an ordered list of roots and
//!   enumerates every fragment for documentation builds.
//! - [`parse`]: JSON / YAML decoding into [`apispec_core::Fragment`].
//! - [`resolver`]: per-action memoization of fragment lookups.
//! - [`validate`]: Draft 2020-12 validation through the `jsonschema` crate,
//!   with fragment `$defs` merged into every sub-schema.

pub mod error;
pub mod parse;
pub mod resolver;
pub mod store;
pub mod validate;

pub use error::SchemaError;
pub use parse::{load_fragment, FragmentFormat};
pub use resolver::SchemaResolver;
pub use store::{FragmentEntry, FragmentStore, SCHEMA_SUFFIXES};
pub use validate::{check, compile, Violation};

//! # apispec-core — Foundational Types
//!
//! Leaf crate of the apispec workspace. Defines the data model every other
//! crate shares: which action a schema belongs to, what a schema fragment
//! looks like once decoded, how its schemas classify, and how validation
//! failures are reported.
//!
//! ## Key Design Principles
//!
//! 1. **`ActionId` newtype.** An action is identified by a
//!    `(namespace, action)` pair with a validated constructor. The pair is
//!    also the fragment cache key (`"{namespace}#{action}"`) and the
//!    synthesized `operationId` in the aggregate document.
//!
//! 2. **Classify once.** [`Fragment::from_value`] decodes the fragment and
//!    immediately classifies every schema it needs later into a closed
//!    [`SchemaNode`] variant set. Coercion and permit-list derivation
//!    pattern-match on nodes instead of re-inspecting raw maps.
//!
//! 3. **Raw schemas stay raw.** The external JSON Schema validator and the
//!    document builder consume the untouched `serde_json::Value` trees, so
//!    no keyword is lost in translation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `apispec-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod fragment;
pub mod identity;
pub mod node;
pub mod record;
pub mod reference;

pub use error::CoreError;
pub use fragment::{
    Definitions, Fragment, NodeIndex, ParameterDescriptor, ParameterLocation, JSON_MEDIA_TYPE,
    MULTIPART_MEDIA_TYPE,
};
pub use identity::ActionId;
pub use node::{ScalarKind, SchemaNode};
pub use record::ValidationErrorRecord;
pub use reference::{rewrite_local_refs, with_definitions, Reference};

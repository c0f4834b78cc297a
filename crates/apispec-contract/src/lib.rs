//! # apispec-contract — Contract Enforcement and Documentation
//!
//! Everything that consumes a resolved fragment:
//!
//! - [`routes`]: which path template and method an action is served under.
//! - [`request`]: parameter coercion and request validation.
//! - [`response`]: status-based response schema selection and validation.
//! - [`params`]: strong-parameters allow-list derivation.
//! - [`document`]: the aggregate OpenAPI document.
//! - [`conformance`]: a response assertion for test suites.
//!
//! The crate is framework-agnostic. Requests and responses are seen through
//! the [`RequestView`] and [`ResponseView`] traits; routing tables are
//! plain [`RouteTable`] values.

pub mod conformance;
pub mod document;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod routes;

pub use conformance::{assert_response_conforms, ConformanceFailure};
pub use document::{AggregateDocument, DefinitionCollision, DocumentBuilder, Info, OPENAPI_VERSION};
pub use error::ContractError;
pub use params::{ParameterDeriver, PermitEntry, PermitList};
pub use request::{
    merge_pairs, BodyStream, BufferedRequest, FileMeta, FormValue, RawParam, RequestValidator, RequestView,
};
pub use response::{BufferedResponse, ResponseValidator, ResponseView};
pub use routes::{normalize_path, RouteEntry, RouteInspector, RouteMatch, RouteTable, Verb};

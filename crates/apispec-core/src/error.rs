//! # Error Types
//!
//! Errors raised while constructing core values. Validation failures are
//! not errors at this level; they are [`ValidationErrorRecord`]s collected
//! by the contract crate.
//!
//! [`ValidationErrorRecord`]: crate::record::ValidationErrorRecord

use thiserror::Error;

/// Error constructing a core value.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An action identity failed validation.
    #[error("invalid action identity '{value}': {reason}")]
    InvalidActionId {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A fragment document did not match the fragment shape.
    #[error("fragment decode error: {0}")]
    FragmentDecode(#[from] serde_json::Error),
}

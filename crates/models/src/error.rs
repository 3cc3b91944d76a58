//! Error types for the model crate.
//!
//! Models work in dense-index space; id-level validation lives in the
//! facade. The only failure a trained model can report is a reference
//! to an index outside the working set it was trained on.

use thiserror::Error;

/// Errors raised by trained models.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A user index outside the trained user range.
    #[error("user index {index} out of range ({len} users in trained index)")]
    UserOutOfRange { index: usize, len: usize },

    /// An item index outside the trained item range.
    #[error("item index {index} out of range ({len} items in trained index)")]
    ItemOutOfRange { index: usize, len: usize },
}

/// Convenience type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, ModelError>;

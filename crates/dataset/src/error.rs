//! Error types for the dataset crate.

use thiserror::Error;

/// Errors that can occur while building the working set.
///
/// Every variant carries enough context for the caller to render a
/// specific message (offending counts, thresholds).
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Filtering collapsed the working set (or the input was empty).
    #[error(
        "insufficient data: {users} users / {items} items survive thresholds \
         (min_user_ratings={min_user_ratings}, min_item_ratings={min_item_ratings})"
    )]
    InsufficientData {
        users: usize,
        items: usize,
        min_user_ratings: usize,
        min_item_ratings: usize,
    },

    /// A rating value fell outside the valid half-star scale.
    #[error("invalid rating {value} for user {user_id} on item {item_id}")]
    InvalidRating {
        user_id: String,
        item_id: String,
        value: f32,
    },

    /// The threshold filter did not reach a fixed point within the pass cap.
    #[error("working-set filter did not converge after {passes} passes")]
    FilterDiverged { passes: usize },
}

/// Convenience type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, DatasetError>;

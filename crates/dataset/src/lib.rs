//! # Dataset Crate
//!
//! Domain records and the sparse working set the recommendation models
//! train on.
//!
//! ## Main Components
//!
//! - **types**: flat records (`RatingRecord`, `MovieMeta`) and the
//!   string-id ↔ dense-index `EntityIndex`
//! - **vector**: `SparseVector` with sorted-merge cosine similarity
//! - **matrix**: the sparse user×item `RatingMatrix` (dual adjacency,
//!   no dense allocation)
//! - **prepare**: last-write-wins dedup plus the fixed-point threshold
//!   filter that produces the working set
//! - **error**: typed errors for data preparation
//!
//! ## Example Usage
//!
//! ```ignore
//! use dataset::{prepare, RatingRecord};
//!
//! let prepared = prepare(&ratings, &metadata, 30, 10)?;
//! println!(
//!     "{} users x {} items, {} ratings",
//!     prepared.users.len(),
//!     prepared.items.len(),
//!     prepared.matrix.nnz()
//! );
//! ```

// Public modules
pub mod error;
pub mod matrix;
pub mod prepare;
pub mod types;
pub mod vector;

// Re-export commonly used types for convenience
pub use error::{DatasetError, Result};
pub use matrix::{RatingMatrix, RatingTriple};
pub use prepare::{prepare, PreparedDataset};
pub use types::{EntityIndex, MovieMeta, RatingRecord};
pub use vector::SparseVector;

//! # Models Crate
//!
//! The trainable numeric models of the recommendation engine.
//!
//! ## Components
//!
//! ### Latent Factor Model (`factor`)
//! Regularized SGD matrix factorization over the sparse rating matrix:
//! learns per-user and per-item vectors plus bias terms, predicts
//! unobserved ratings, reports RMSE/MAE on held-out data.
//!
//! ### Item Similarity (`similarity`)
//! One contract, two strategies: a precomputed top-k pruned structure
//! (memory bounded, O(top_k) queries) and an on-demand scan (no
//! persistent structure, O(|items|) queries). Works over any item
//! vector set, rating columns and content vectors alike.
//!
//! ### Content Features (`content`)
//! TF-IDF vectors over item text with a capped, deterministically
//! chosen vocabulary.

// Public modules
pub mod content;
pub mod error;
pub mod factor;
pub mod similarity;

// Re-export commonly used types
pub use content::{build_content_vectors, Vocabulary};
pub use error::{ModelError, Result};
pub use factor::{train, Accuracy, FactorHyperparams, FactorModel};
pub use similarity::{FullSimilarity, ItemSimilarityProvider, LiteSimilarity, Neighbor};

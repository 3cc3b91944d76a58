//! # Engine Crate
//!
//! Orchestration and serving surface of the recommendation core.
//!
//! ## Components
//!
//! - **config**: every hyperparameter as a named, validated field
//! - **train**: the full training pipeline (prepare → factor model →
//!   content vectors → similarity structures → bundle)
//! - **hybrid**: blended CF + content scoring with an observable
//!   cold-start fallback
//! - **bundle**: one opaque, versioned blob per model generation
//! - **facade**: the query entry points (`recommend_for_user`,
//!   `similar_to_item`, `hybrid_recommend`) over a hot-swappable
//!   bundle handle
//! - **error**: the typed error taxonomy crossing the core boundary
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{train_model, EngineConfig, Recommender, SimilarityMethod};
//!
//! let config = EngineConfig::default().with_thresholds(5, 3);
//! let bundle = train_model(&ratings, &metadata, &config)?;
//!
//! let recommender = Recommender::with_bundle(bundle);
//! let picks = recommender.hybrid_recommend("user-17", 10)?;
//! let similar = recommender.similar_to_item("item-3", 10, SimilarityMethod::Content)?;
//! ```

// Public modules
pub mod bundle;
pub mod config;
pub mod error;
pub mod facade;
pub mod hybrid;
pub mod train;

// Re-export the public surface
pub use bundle::{ModelBundle, BUNDLE_VERSION};
pub use config::{EngineConfig, SimilarityStrategy};
pub use error::{EngineError, Result};
pub use facade::{Recommendation, Recommender, SimilarityMethod};
pub use hybrid::ExplanationFlags;
pub use train::train_model;

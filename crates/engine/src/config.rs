//! Engine configuration with fail-fast validation.
//!
//! Every hyperparameter is a named field; out-of-range values are
//! rejected with a configuration error naming the field instead of
//! being silently clamped.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Tolerance when checking that the hybrid weights sum to 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Which item-similarity strategy the trainer materialises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityStrategy {
    /// Precompute top-k pruned neighbour lists for every item at
    /// training time; queries are lookups.
    Full,
    /// Keep only the base vectors; similarity rows are computed per
    /// query and discarded.
    Lite,
}

/// All hyperparameters for one training run plus query-time weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // Latent factor training
    pub n_factors: usize,
    pub n_epochs: usize,
    pub learning_rate: f64,
    pub regularization: f64,

    // Working-set thresholds
    pub min_user_ratings: usize,
    pub min_item_ratings: usize,

    // Similarity and content
    pub top_k: usize,
    pub max_vocab_terms: usize,
    pub similarity_strategy: SimilarityStrategy,

    // Hybrid blending
    pub cf_weight: f64,
    pub cb_weight: f64,

    // Evaluation and reproducibility
    /// Fraction of observed ratings held out of factor training for
    /// RMSE/MAE reporting; 0.0 disables the holdout split.
    pub holdout_fraction: f64,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_factors: 50,
            n_epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            min_user_ratings: 30,
            min_item_ratings: 10,
            top_k: 50,
            max_vocab_terms: 3000,
            similarity_strategy: SimilarityStrategy::Full,
            cf_weight: 0.6,
            cb_weight: 0.4,
            holdout_fraction: 0.0,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Configure the working-set thresholds.
    pub fn with_thresholds(mut self, min_user_ratings: usize, min_item_ratings: usize) -> Self {
        self.min_user_ratings = min_user_ratings;
        self.min_item_ratings = min_item_ratings;
        self
    }

    /// Configure the hybrid blend weights.
    pub fn with_weights(mut self, cf_weight: f64, cb_weight: f64) -> Self {
        self.cf_weight = cf_weight;
        self.cb_weight = cb_weight;
        self
    }

    /// Configure the similarity strategy.
    pub fn with_strategy(mut self, strategy: SimilarityStrategy) -> Self {
        self.similarity_strategy = strategy;
        self
    }

    /// Configure the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate every field, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        let fail = |field: &'static str, reason: String| Err(EngineError::Config { field, reason });

        if self.n_factors == 0 {
            return fail("n_factors", "must be at least 1".into());
        }
        if self.n_epochs == 0 {
            return fail("n_epochs", "must be at least 1".into());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return fail(
                "learning_rate",
                format!("must be a positive finite number, got {}", self.learning_rate),
            );
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return fail(
                "regularization",
                format!("must be non-negative and finite, got {}", self.regularization),
            );
        }
        if self.top_k == 0 {
            return fail("top_k", "must be at least 1".into());
        }
        if self.max_vocab_terms == 0 {
            return fail("max_vocab_terms", "must be at least 1".into());
        }
        if !self.cf_weight.is_finite() || self.cf_weight < 0.0 {
            return fail(
                "cf_weight",
                format!("must be non-negative and finite, got {}", self.cf_weight),
            );
        }
        if !self.cb_weight.is_finite() || self.cb_weight < 0.0 {
            return fail(
                "cb_weight",
                format!("must be non-negative and finite, got {}", self.cb_weight),
            );
        }
        // The blend must be a convex combination; a sum away from 1.0
        // is rejected, never renormalised.
        let weight_sum = self.cf_weight + self.cb_weight;
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return fail(
                "cf_weight",
                format!("cf_weight + cb_weight must sum to 1.0, got {}", weight_sum),
            );
        }
        if !self.holdout_fraction.is_finite()
            || self.holdout_fraction < 0.0
            || self.holdout_fraction >= 1.0
        {
            return fail(
                "holdout_fraction",
                format!("must be in [0.0, 1.0), got {}", self.holdout_fraction),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let config = EngineConfig {
            top_k: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EngineError::Config { field: "top_k", .. }));
    }

    #[test]
    fn test_negative_learning_rate_rejected() {
        let config = EngineConfig {
            learning_rate: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::Config { field: "learning_rate", .. })
        ));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = EngineConfig::default().with_weights(0.6, 0.6);
        assert!(config.validate().is_err());

        let config = EngineConfig::default().with_weights(0.3, 0.7);
        assert!(config.validate().is_ok());

        // Pure content weighting is allowed.
        let config = EngineConfig::default().with_weights(0.0, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_holdout_fraction_range() {
        let config = EngineConfig {
            holdout_fraction: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            holdout_fraction: 0.2,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

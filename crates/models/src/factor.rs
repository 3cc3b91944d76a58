//! Latent factor model trained by regularized stochastic gradient
//! descent.
//!
//! ## Algorithm
//! The model approximates the rating matrix as
//! `r(u, i) ≈ μ + b_u + b_i + p_u · q_i` with user/item factor vectors
//! `p_u`, `q_i` and bias terms. Each epoch visits every observed
//! rating once, in an order reshuffled per epoch, and applies the
//! standard regularized SGD step:
//!
//! ```text
//! e    = r - predict(u, i)
//! b_u += lr * (e - reg * b_u)
//! b_i += lr * (e - reg * b_i)
//! p_u += lr * (e * q_i - reg * p_u)
//! q_i += lr * (e * p_u - reg * q_i)
//! ```
//!
//! Training is a single-threaded, uninterruptible batch: there is no
//! partial-epoch state to observe, and the same seed always produces
//! the same model.
//!
//! ## Numeric Note
//! Predictions are *not* clipped to the rating scale here; callers that
//! want display-ready values clip themselves. Keeping raw predictions
//! makes RMSE/MAE meaningful.

use crate::error::{ModelError, Result};
use dataset::RatingMatrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Spread of the uniform factor initialisation.
const INIT_SCALE: f64 = 0.1;

/// Hyperparameters for one training run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorHyperparams {
    pub n_factors: usize,
    pub n_epochs: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    /// Seed for factor initialisation and per-epoch shuffling.
    pub seed: u64,
}

/// Error metrics over a rating set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub rmse: f64,
    pub mae: f64,
}

/// A trained latent factor model.
///
/// Immutable after training; retraining builds a whole new model from a
/// fresh matrix snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorModel {
    n_users: usize,
    n_items: usize,
    n_factors: usize,
    global_mean: f64,
    /// Row-major |users| x n_factors.
    user_factors: Vec<f64>,
    /// Row-major |items| x n_factors.
    item_factors: Vec<f64>,
    user_bias: Vec<f64>,
    item_bias: Vec<f64>,
}

impl FactorModel {
    pub fn n_users(&self) -> usize {
        self.n_users
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Predicted rating for a (user, item) pair, unclipped.
    pub fn predict(&self, user: usize, item: usize) -> Result<f64> {
        if user >= self.n_users {
            return Err(ModelError::UserOutOfRange {
                index: user,
                len: self.n_users,
            });
        }
        if item >= self.n_items {
            return Err(ModelError::ItemOutOfRange {
                index: item,
                len: self.n_items,
            });
        }
        Ok(self.predict_unchecked(user, item))
    }

    fn predict_unchecked(&self, user: usize, item: usize) -> f64 {
        let p = &self.user_factors[user * self.n_factors..(user + 1) * self.n_factors];
        let q = &self.item_factors[item * self.n_factors..(item + 1) * self.n_factors];
        let dot: f64 = p.iter().zip(q).map(|(a, b)| a * b).sum();
        self.global_mean + self.user_bias[user] + self.item_bias[item] + dot
    }

    /// RMSE and MAE over held-out `(user, item, rating)` triples.
    ///
    /// Triples must reference indices inside the trained range (they
    /// come from the same working set the model was trained on).
    pub fn evaluate(&self, held_out: &[(u32, u32, f32)]) -> Accuracy {
        if held_out.is_empty() {
            return Accuracy { rmse: 0.0, mae: 0.0 };
        }

        let mut squared = 0.0f64;
        let mut absolute = 0.0f64;
        for &(user, item, rating) in held_out {
            let error = rating as f64 - self.predict_unchecked(user as usize, item as usize);
            squared += error * error;
            absolute += error.abs();
        }
        let n = held_out.len() as f64;
        Accuracy {
            rmse: (squared / n).sqrt(),
            mae: absolute / n,
        }
    }
}

/// Train a factor model on every observed entry of the matrix.
pub fn train(matrix: &RatingMatrix, params: &FactorHyperparams) -> FactorModel {
    let n_users = matrix.n_users();
    let n_items = matrix.n_items();
    let k = params.n_factors;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut model = FactorModel {
        n_users,
        n_items,
        n_factors: k,
        global_mean: matrix.global_mean(),
        user_factors: (0..n_users * k)
            .map(|_| rng.random_range(-INIT_SCALE..INIT_SCALE))
            .collect(),
        item_factors: (0..n_items * k)
            .map(|_| rng.random_range(-INIT_SCALE..INIT_SCALE))
            .collect(),
        user_bias: vec![0.0; n_users],
        item_bias: vec![0.0; n_items],
    };

    let mut triples = matrix.triples();
    let lr = params.learning_rate;
    let reg = params.regularization;
    let mut p_old = vec![0.0f64; k];

    for epoch in 0..params.n_epochs {
        // Randomized visit order avoids systematic bias from the
        // row-major layout of the matrix.
        triples.shuffle(&mut rng);

        for &(user, item, rating) in &triples {
            let (u, i) = (user as usize, item as usize);
            let error = rating as f64 - model.predict_unchecked(u, i);

            model.user_bias[u] += lr * (error - reg * model.user_bias[u]);
            model.item_bias[i] += lr * (error - reg * model.item_bias[i]);

            // The item update uses the pre-step user factors, so take a
            // copy before either side moves.
            p_old.copy_from_slice(&model.user_factors[u * k..(u + 1) * k]);

            for f in 0..k {
                let pf = p_old[f];
                let qf = model.item_factors[i * k + f];
                model.user_factors[u * k + f] += lr * (error * qf - reg * pf);
                model.item_factors[i * k + f] += lr * (error * pf - reg * qf);
            }
        }

        debug!(epoch = epoch + 1, n_epochs = params.n_epochs, "sgd epoch complete");
    }

    model
}

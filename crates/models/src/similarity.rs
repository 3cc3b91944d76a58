//! Item-to-item similarity with two interchangeable strategies.
//!
//! Both strategies answer the question "which items have the most
//! similar vectors to this one?" and must return identical
//! ordered top-k lists for the same inputs. They differ only in when
//! the work happens:
//!
//! - [`FullSimilarity`] computes every pairwise similarity once at
//!   build time and keeps only the `top_k` best neighbours per item,
//!   bounding memory to O(|items| × top_k) instead of O(|items|²).
//!   Queries are a slice lookup.
//! - [`LiteSimilarity`] keeps nothing: each query scans the queried
//!   item's vector against all others and discards the scores
//!   afterwards. O(|items|) per call, O(1) extra memory.
//!
//! The strategy is chosen at construction time; both sides rank
//! through the same comparator (score descending, item index ascending
//! on ties, positive scores only), which is what makes the
//! full-vs-lite equivalence hold by construction.
//!
//! The vectors compared can be anything: rating-matrix columns for
//! collaborative similarity, TF-IDF vectors for content similarity.

use crate::error::{ModelError, Result};
use dataset::SparseVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One ranked neighbour of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub item: u32,
    pub score: f64,
}

/// Common contract for both similarity strategies.
pub trait ItemSimilarityProvider {
    /// Number of items in the compared set.
    fn n_items(&self) -> usize;

    /// Up to `k` most similar items, best first, self excluded.
    ///
    /// An item with no positively-similar neighbours yields an empty
    /// list; that is an answer, not an error.
    fn similar_items(&self, item: usize, k: usize) -> Result<Vec<Neighbor>>;
}

/// Rank scored candidates: self excluded, non-positive scores dropped,
/// score descending with item-index-ascending tie-break, top k kept.
///
/// Every similarity path funnels through here so the two strategies
/// cannot drift apart in ordering rules.
fn rank_top_k(item: usize, scores: impl Iterator<Item = (usize, f64)>, k: usize) -> Vec<Neighbor> {
    let mut neighbors: Vec<Neighbor> = scores
        .filter(|&(other, score)| other != item && score > 0.0)
        .map(|(other, score)| Neighbor {
            item: other as u32,
            score,
        })
        .collect();

    neighbors.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.item.cmp(&b.item)));
    neighbors.truncate(k);
    neighbors
}

fn check_item(item: usize, len: usize) -> Result<()> {
    if item >= len {
        return Err(ModelError::ItemOutOfRange { index: item, len });
    }
    Ok(())
}

/// Precomputed, top-k pruned similarity structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullSimilarity {
    top_k: usize,
    neighbors: Vec<Vec<Neighbor>>,
}

impl FullSimilarity {
    /// Compute pairwise similarities for every item and keep the top
    /// `top_k` per item.
    ///
    /// ## Performance Note
    /// Each item's row is independent, so rows are computed in
    /// parallel; workers share only the read-only vectors and write to
    /// disjoint output slots.
    pub fn build(vectors: &[SparseVector], top_k: usize) -> Self {
        let norms: Vec<f64> = vectors.iter().map(|v| v.norm()).collect();

        let neighbors: Vec<Vec<Neighbor>> = vectors
            .par_iter()
            .enumerate()
            .map(|(i, vector)| {
                if norms[i] == 0.0 {
                    return Vec::new();
                }
                let scores = vectors.iter().enumerate().map(|(j, other)| {
                    let denom = norms[i] * norms[j];
                    let score = if denom == 0.0 {
                        0.0
                    } else {
                        vector.dot(other) / denom
                    };
                    (j, score)
                });
                rank_top_k(i, scores, top_k)
            })
            .collect();

        let kept: usize = neighbors.iter().map(|n| n.len()).sum();
        info!(
            items = vectors.len(),
            top_k,
            kept,
            "built pruned similarity structure"
        );

        Self { top_k, neighbors }
    }

    /// The pruning bound this structure was built with. Queries for
    /// more than `top_k` neighbours can only return `top_k`.
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

impl ItemSimilarityProvider for FullSimilarity {
    fn n_items(&self) -> usize {
        self.neighbors.len()
    }

    fn similar_items(&self, item: usize, k: usize) -> Result<Vec<Neighbor>> {
        check_item(item, self.neighbors.len())?;
        Ok(self.neighbors[item].iter().take(k).copied().collect())
    }
}

/// On-demand similarity over a borrowed vector set.
///
/// Holds no state of its own beyond the borrow; every query recomputes
/// the queried item's row and drops it afterwards.
pub struct LiteSimilarity<'a> {
    vectors: &'a [SparseVector],
}

impl<'a> LiteSimilarity<'a> {
    pub fn new(vectors: &'a [SparseVector]) -> Self {
        Self { vectors }
    }
}

impl ItemSimilarityProvider for LiteSimilarity<'_> {
    fn n_items(&self) -> usize {
        self.vectors.len()
    }

    fn similar_items(&self, item: usize, k: usize) -> Result<Vec<Neighbor>> {
        check_item(item, self.vectors.len())?;

        let vector = &self.vectors[item];
        let norm = vector.norm();
        if norm == 0.0 {
            return Ok(Vec::new());
        }

        let scores = self.vectors.iter().enumerate().map(|(j, other)| {
            let denom = norm * other.norm();
            let score = if denom == 0.0 {
                0.0
            } else {
                vector.dot(other) / denom
            };
            (j, score)
        });
        Ok(rank_top_k(item, scores, k))
    }
}

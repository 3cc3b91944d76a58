//! Hybrid scoring: blending factor predictions with content affinity.
//!
//! ## Algorithm
//! 1. Candidates are every working-set item the user has not rated
//! 2. CF component: factor-model predictions for the candidate pool,
//!    min-max normalised *within that pool*; the range depends on the
//!    candidates, so it is recomputed per call, never cached globally
//! 3. CB component: cosine between the user's content profile (mean
//!    TF-IDF vector of the items they rated) and each candidate's
//!    vector; already in [0, 1], used as-is
//! 4. `score = cf_weight * cf_normalised + cb_weight * cb`
//! 5. Descending by score, ties by item id ascending
//!
//! ## Cold Start
//! A user with no ratings in the working set has no CF prediction and
//! no content profile. The scorer answers anyway with effective
//! weights (0, 1) and marks every returned candidate with
//! `cold_start_fallback`, so the degradation is observable instead of
//! silent.

use crate::bundle::ModelBundle;
use crate::error::Result;
use dataset::SparseVector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Guards the min-max denominator when every candidate predicts the
/// same value.
const NORMALIZATION_EPSILON: f64 = 1e-10;

/// Degenerate-case markers attached to each ranked result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationFlags {
    /// The user had no ratings in the working set; the score is
    /// content-only regardless of the configured weights.
    pub cold_start_fallback: bool,
}

/// One ranked candidate in dense-index space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub item: usize,
    pub score: f64,
    pub flags: ExplanationFlags,
}

/// Blend a normalised CF score with a content score.
pub fn blend(cf_weight: f64, cb_weight: f64, cf_normalized: f64, cb_score: f64) -> f64 {
    cf_weight * cf_normalized + cb_weight * cb_score
}

/// Rank all unrated items for a user.
///
/// `user` is `None` for ids outside the trained index: they are served
/// the same cold-start path as an indexed user with zero ratings.
pub(crate) fn hybrid_rank(
    bundle: &ModelBundle,
    user: Option<usize>,
    n: usize,
) -> Result<Vec<ScoredCandidate>> {
    let n_items = bundle.items.len();

    let rated: HashSet<u32> = match user {
        Some(user) => bundle
            .matrix
            .user_row(user)
            .entries()
            .iter()
            .map(|&(item, _)| item)
            .collect(),
        None => HashSet::new(),
    };

    let candidates: Vec<usize> = (0..n_items)
        .filter(|&item| !rated.contains(&(item as u32)))
        .collect();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let cold_start = user.is_none() || rated.is_empty();
    let flags = ExplanationFlags {
        cold_start_fallback: cold_start,
    };
    let (cf_weight, cb_weight) = if cold_start {
        (0.0, 1.0)
    } else {
        (bundle.config.cf_weight, bundle.config.cb_weight)
    };

    // CF predictions, normalised over this candidate pool.
    let cf_normalized: Vec<f64> = if cold_start {
        vec![0.0; candidates.len()]
    } else {
        let user = user.expect("cold_start is false");
        let raw = candidates
            .iter()
            .map(|&item| bundle.factors.predict(user, item))
            .collect::<models::Result<Vec<f64>>>()?;

        let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
        let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        raw.iter()
            .map(|&p| (p - min) / (max - min + NORMALIZATION_EPSILON))
            .collect()
    };

    // Content profile: mean vector of the items the user rated.
    let profile = match user {
        Some(user) if !cold_start => SparseVector::mean(
            bundle
                .matrix
                .user_row(user)
                .entries()
                .iter()
                .map(|&(item, _)| &bundle.content_vectors[item as usize]),
        ),
        _ => SparseVector::new(),
    };

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .zip(&cf_normalized)
        .map(|(&item, &cf)| {
            let cb = profile.cosine(&bundle.content_vectors[item]);
            ScoredCandidate {
                item,
                score: blend(cf_weight, cb_weight, cf, cb),
                flags,
            }
        })
        .collect();

    // Item indices were assigned from sorted ids, so index order is id
    // order and this tie-break matches "item id ascending".
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.item.cmp(&b.item)));
    scored.truncate(n);

    debug!(
        candidates = candidates.len(),
        returned = scored.len(),
        cold_start,
        "hybrid ranking complete"
    );
    Ok(scored)
}

//! The recommendation facade.
//!
//! [`Recommender`] is the one entry point the serving layer talks to.
//! It holds the current model bundle behind a swappable handle:
//! queries snapshot an `Arc` to the bundle and then run without any
//! synchronisation, and installing a retrained bundle is a single
//! pointer replacement. In-flight queries keep the generation they
//! started with, so no query ever observes a half-swapped model.
//!
//! Entity-id validation is centralised here: the three query types
//! share one resolve path, so an unknown id produces the same typed
//! error everywhere.

use crate::bundle::ModelBundle;
use crate::error::{EngineError, Result};
use crate::hybrid::{self, ExplanationFlags};
use dataset::MovieMeta;
use models::{FullSimilarity, ItemSimilarityProvider, LiteSimilarity, Neighbor};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::{Arc, RwLock};
use tracing::instrument;

/// Valid rating range; CF predictions are clipped to it for display.
const RATING_MIN: f64 = 0.5;
const RATING_MAX: f64 = 5.0;

/// Pool size for popular-item sampling.
const POPULAR_POOL: usize = 200;

/// Which similarity family a `similar_to_item` query uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMethod {
    /// Rating-pattern similarity over the user×item matrix columns.
    Collaborative,
    /// Text similarity over the TF-IDF vectors.
    Content,
}

/// One entry of a ranked answer, enriched with display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub item_id: String,
    pub title: String,
    pub score: f64,
    pub flags: ExplanationFlags,
}

/// Stateless query front over the currently installed bundle.
pub struct Recommender {
    current: RwLock<Option<Arc<ModelBundle>>>,
}

impl Recommender {
    /// A facade with no bundle yet; queries fail with
    /// [`EngineError::ModelNotTrained`] until one is installed.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// A facade serving the given bundle.
    pub fn with_bundle(bundle: ModelBundle) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(bundle))),
        }
    }

    /// Atomically replace the served bundle.
    pub fn install(&self, bundle: ModelBundle) {
        let mut current = self.current.write().expect("bundle lock poisoned");
        *current = Some(Arc::new(bundle));
    }

    /// Snapshot the current bundle for one query.
    pub fn snapshot(&self) -> Result<Arc<ModelBundle>> {
        self.current
            .read()
            .expect("bundle lock poisoned")
            .clone()
            .ok_or(EngineError::ModelNotTrained)
    }

    /// Collaborative-filtering recommendations: the user's unrated
    /// items ranked by predicted rating, clipped to the rating scale.
    #[instrument(skip(self))]
    pub fn recommend_for_user(&self, user_id: &str, n: usize) -> Result<Vec<Recommendation>> {
        let bundle = self.snapshot()?;
        let user = resolve_user(&bundle, user_id)?;

        let rated: std::collections::HashSet<u32> = bundle
            .matrix
            .user_row(user)
            .entries()
            .iter()
            .map(|&(item, _)| item)
            .collect();

        let mut scored: Vec<(usize, f64)> = (0..bundle.items.len())
            .filter(|&item| !rated.contains(&(item as u32)))
            .map(|item| {
                let predicted = bundle.factors.predict(user, item)?;
                Ok((item, predicted.clamp(RATING_MIN, RATING_MAX)))
            })
            .collect::<Result<_>>()?;

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(n);

        Ok(scored
            .into_iter()
            .map(|(item, score)| make_recommendation(&bundle, item, score, ExplanationFlags::default()))
            .collect())
    }

    /// Items most similar to the given one, by rating pattern or by
    /// content, depending on `method`.
    ///
    /// Under the full strategy this is a lookup into the pruned
    /// structure built at training time; under the lite strategy the
    /// similarity row is computed here and discarded.
    #[instrument(skip(self))]
    pub fn similar_to_item(
        &self,
        item_id: &str,
        k: usize,
        method: SimilarityMethod,
    ) -> Result<Vec<Recommendation>> {
        let bundle = self.snapshot()?;
        let item = resolve_item(&bundle, item_id)?;

        let (vectors, precomputed): (&[dataset::SparseVector], Option<&FullSimilarity>) =
            match method {
                SimilarityMethod::Collaborative => {
                    (bundle.matrix.item_columns(), bundle.cf_neighbors.as_ref())
                }
                SimilarityMethod::Content => {
                    (&bundle.content_vectors, bundle.cb_neighbors.as_ref())
                }
            };

        let neighbors: Vec<Neighbor> = match precomputed {
            Some(full) => full.similar_items(item, k)?,
            None => LiteSimilarity::new(vectors).similar_items(item, k)?,
        };

        Ok(neighbors
            .into_iter()
            .map(|neighbor| {
                make_recommendation(
                    &bundle,
                    neighbor.item as usize,
                    neighbor.score,
                    ExplanationFlags::default(),
                )
            })
            .collect())
    }

    /// Hybrid recommendations blending CF and content scores.
    ///
    /// A user id outside the trained index is served the cold-start
    /// path (content-only, flagged) instead of an error; a degraded
    /// answer beats no answer for this query type.
    #[instrument(skip(self))]
    pub fn hybrid_recommend(&self, user_id: &str, n: usize) -> Result<Vec<Recommendation>> {
        let bundle = self.snapshot()?;
        let user = bundle.users.index_of(user_id);

        let scored = hybrid::hybrid_rank(&bundle, user, n)?;
        Ok(scored
            .into_iter()
            .map(|candidate| {
                make_recommendation(&bundle, candidate.item, candidate.score, candidate.flags)
            })
            .collect())
    }

    /// A random sample of widely-rated items, for surfacing something
    /// to brand-new users before any model signal exists.
    pub fn popular_items<R: Rng>(
        &self,
        n: usize,
        exclude: &[String],
        rng: &mut R,
    ) -> Result<Vec<Recommendation>> {
        let bundle = self.snapshot()?;

        let mut by_count: Vec<(usize, usize)> = (0..bundle.items.len())
            .map(|item| (item, bundle.matrix.item_column(item).len()))
            .collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        by_count.truncate(POPULAR_POOL);

        let mut pool: Vec<(usize, usize)> = by_count
            .into_iter()
            .filter(|&(item, _)| !exclude.iter().any(|id| id == bundle.items.id_of(item)))
            .collect();
        pool.shuffle(rng);
        pool.truncate(n);

        Ok(pool
            .into_iter()
            .map(|(item, count)| {
                make_recommendation(&bundle, item, count as f64, ExplanationFlags::default())
            })
            .collect())
    }

    /// Case-insensitive substring search over working-set titles.
    pub fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<MovieMeta>> {
        let bundle = self.snapshot()?;
        let needle = query.to_lowercase();

        Ok(bundle
            .metadata
            .iter()
            .filter(|meta| meta.title.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    /// The user's own highest-rated items, for showing alongside
    /// recommendations.
    #[instrument(skip(self))]
    pub fn top_rated_by_user(&self, user_id: &str, n: usize) -> Result<Vec<Recommendation>> {
        let bundle = self.snapshot()?;
        let user = resolve_user(&bundle, user_id)?;

        let mut rated: Vec<(u32, f32)> = bundle.matrix.user_row(user).entries().to_vec();
        rated.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        rated.truncate(n);

        Ok(rated
            .into_iter()
            .map(|(item, rating)| {
                make_recommendation(
                    &bundle,
                    item as usize,
                    rating as f64,
                    ExplanationFlags::default(),
                )
            })
            .collect())
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_user(bundle: &ModelBundle, user_id: &str) -> Result<usize> {
    bundle
        .users
        .index_of(user_id)
        .ok_or_else(|| EngineError::UnknownEntity {
            entity: "user",
            id: user_id.to_string(),
        })
}

fn resolve_item(bundle: &ModelBundle, item_id: &str) -> Result<usize> {
    bundle
        .items
        .index_of(item_id)
        .ok_or_else(|| EngineError::UnknownEntity {
            entity: "item",
            id: item_id.to_string(),
        })
}

fn make_recommendation(
    bundle: &ModelBundle,
    item: usize,
    score: f64,
    flags: ExplanationFlags,
) -> Recommendation {
    Recommendation {
        item_id: bundle.items.id_of(item).to_string(),
        title: bundle.metadata[item].title.clone(),
        score,
        flags,
    }
}

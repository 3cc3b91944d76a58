//! Training orchestration.
//!
//! Runs the whole pipeline for one model generation:
//! 1. Validate configuration (fail fast, nothing partial)
//! 2. Prepare the working set (dedup, fixed-point filter, indices)
//! 3. Optionally hold out a fraction of ratings for evaluation
//! 4. Train the latent factor model
//! 5. Build the content vector space
//! 6. Build pruned similarity structures (full strategy only)
//! 7. Assemble the bundle
//!
//! The epoch loop inside step 4 is deliberately uninterruptible; a
//! cancelled training run aborts wholesale and leaves no bundle, never
//! a half-updated one.

use crate::bundle::ModelBundle;
use crate::config::{EngineConfig, SimilarityStrategy};
use crate::error::Result;
use dataset::{prepare, MovieMeta, RatingMatrix, RatingRecord, RatingTriple};
use models::{build_content_vectors, factor, FactorHyperparams, FullSimilarity};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Instant;
use tracing::info;

/// Train a complete model bundle from raw tables.
pub fn train_model(
    ratings: &[RatingRecord],
    metadata: &[MovieMeta],
    config: &EngineConfig,
) -> Result<ModelBundle> {
    config.validate()?;
    let started = Instant::now();

    let prepared = prepare(
        ratings,
        metadata,
        config.min_user_ratings,
        config.min_item_ratings,
    )?;
    info!(
        users = prepared.users.len(),
        items = prepared.items.len(),
        ratings = prepared.matrix.nnz(),
        "working set prepared"
    );

    // Holdout split for evaluation; the factor model trains on the
    // remainder, everything else is built from the full matrix.
    let (train_matrix, held_out) = split_holdout(&prepared.matrix, config);

    let step = Instant::now();
    let factors = factor::train(
        train_matrix.as_ref().unwrap_or(&prepared.matrix),
        &FactorHyperparams {
            n_factors: config.n_factors,
            n_epochs: config.n_epochs,
            learning_rate: config.learning_rate,
            regularization: config.regularization,
            seed: config.seed,
        },
    );
    info!(elapsed = ?step.elapsed(), "factor model trained");

    let holdout_accuracy = if held_out.is_empty() {
        None
    } else {
        let accuracy = factors.evaluate(&held_out);
        info!(
            held_out = held_out.len(),
            rmse = accuracy.rmse,
            mae = accuracy.mae,
            "holdout evaluation"
        );
        Some(accuracy)
    };

    let step = Instant::now();
    let documents: Vec<String> = prepared
        .metadata
        .iter()
        .map(|meta| meta.content_text())
        .collect();
    let (content_vectors, vocabulary) =
        build_content_vectors(&documents, config.max_vocab_terms);
    info!(
        vocabulary = vocabulary.len(),
        elapsed = ?step.elapsed(),
        "content vectors built"
    );

    let (cf_neighbors, cb_neighbors) = match config.similarity_strategy {
        SimilarityStrategy::Full => {
            let step = Instant::now();
            let cf = FullSimilarity::build(prepared.matrix.item_columns(), config.top_k);
            let cb = FullSimilarity::build(&content_vectors, config.top_k);
            info!(elapsed = ?step.elapsed(), top_k = config.top_k, "similarity structures built");
            (Some(cf), Some(cb))
        }
        SimilarityStrategy::Lite => (None, None),
    };

    info!(elapsed = ?started.elapsed(), "training complete");

    Ok(ModelBundle {
        config: config.clone(),
        users: prepared.users,
        items: prepared.items,
        matrix: prepared.matrix,
        metadata: prepared.metadata,
        factors,
        vocabulary,
        content_vectors,
        cf_neighbors,
        cb_neighbors,
        holdout_accuracy,
    })
}

/// Split the observed entries into a train matrix and held-out
/// triples. Returns `(None, [])` when no holdout is configured.
fn split_holdout(
    matrix: &RatingMatrix,
    config: &EngineConfig,
) -> (Option<RatingMatrix>, Vec<RatingTriple>) {
    if config.holdout_fraction <= 0.0 {
        return (None, Vec::new());
    }

    let mut triples = matrix.triples();
    let mut rng = StdRng::seed_from_u64(config.seed);
    triples.shuffle(&mut rng);

    let n_held = (triples.len() as f64 * config.holdout_fraction) as usize;
    // Keep at least one entry on the training side.
    let n_held = n_held.min(triples.len().saturating_sub(1));
    let held_out = triples.split_off(triples.len() - n_held);

    let train_matrix = RatingMatrix::from_triples(matrix.n_users(), matrix.n_items(), &triples);
    info!(
        train = triples.len(),
        held_out = held_out.len(),
        "holdout split"
    );
    (Some(train_matrix), held_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityStrategy;
    use crate::error::EngineError;
    use dataset::DatasetError;

    fn toy_corpus() -> (Vec<RatingRecord>, Vec<MovieMeta>) {
        let mut ratings = Vec::new();
        // 4 users x 5 items, mostly observed.
        let values = [
            ("u1", vec![("m1", 5.0), ("m2", 4.5), ("m3", 1.0), ("m4", 2.0)]),
            ("u2", vec![("m1", 4.0), ("m2", 5.0), ("m3", 2.0), ("m5", 1.5)]),
            ("u3", vec![("m1", 1.0), ("m3", 5.0), ("m4", 4.5), ("m5", 4.0)]),
            ("u4", vec![("m2", 2.0), ("m3", 4.0), ("m4", 5.0), ("m5", 4.5)]),
        ];
        for (user, items) in values {
            for (item, rating) in items {
                ratings.push(RatingRecord::new(user, item, rating));
            }
        }

        let metadata = vec![
            meta("m1", "Signal Fire", "action thriller", "two detectives chase a signal"),
            meta("m2", "Night Patrol", "action crime", "a patrol goes wrong at night"),
            meta("m3", "Quiet Orchard", "drama", "family returns to the orchard"),
            meta("m4", "Harvest Song", "drama romance", "a song carries the harvest"),
            meta("m5", "Glass River", "drama mystery", "secrets surface along the river"),
        ];
        (ratings, metadata)
    }

    fn meta(id: &str, title: &str, genre: &str, synopsis: &str) -> MovieMeta {
        MovieMeta {
            item_id: id.to_string(),
            title: title.to_string(),
            genre: genre.to_string(),
            synopsis: Some(synopsis.to_string()),
            ..Default::default()
        }
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            n_factors: 4,
            n_epochs: 25,
            top_k: 4,
            max_vocab_terms: 100,
            ..Default::default()
        }
        .with_thresholds(1, 1)
    }

    #[test]
    fn test_train_produces_consistent_bundle() {
        let (ratings, metadata) = toy_corpus();
        let bundle = train_model(&ratings, &metadata, &test_config()).unwrap();

        assert_eq!(bundle.users.len(), 4);
        assert_eq!(bundle.items.len(), 5);
        assert_eq!(bundle.matrix.n_users(), bundle.users.len());
        assert_eq!(bundle.matrix.n_items(), bundle.items.len());
        assert_eq!(bundle.content_vectors.len(), bundle.items.len());
        assert_eq!(bundle.metadata.len(), bundle.items.len());
        assert!(bundle.cf_neighbors.is_some());
        assert!(bundle.cb_neighbors.is_some());
        assert!(bundle.holdout_accuracy.is_none());
    }

    #[test]
    fn test_lite_strategy_materialises_nothing() {
        let (ratings, metadata) = toy_corpus();
        let config = test_config().with_strategy(SimilarityStrategy::Lite);
        let bundle = train_model(&ratings, &metadata, &config).unwrap();

        assert!(bundle.cf_neighbors.is_none());
        assert!(bundle.cb_neighbors.is_none());
    }

    #[test]
    fn test_invalid_config_fails_before_touching_data() {
        let (ratings, metadata) = toy_corpus();
        let config = EngineConfig {
            n_epochs: 0,
            ..test_config()
        };
        assert!(matches!(
            train_model(&ratings, &metadata, &config),
            Err(EngineError::Config { field: "n_epochs", .. })
        ));
    }

    #[test]
    fn test_empty_ratings_fail_with_insufficient_data() {
        let (_, metadata) = toy_corpus();
        assert!(matches!(
            train_model(&[], &metadata, &test_config()),
            Err(EngineError::Dataset(DatasetError::InsufficientData { .. }))
        ));
    }

    #[test]
    fn test_holdout_records_accuracy() {
        let (ratings, metadata) = toy_corpus();
        let config = EngineConfig {
            holdout_fraction: 0.25,
            ..test_config()
        };
        let bundle = train_model(&ratings, &metadata, &config).unwrap();

        let accuracy = bundle.holdout_accuracy.unwrap();
        assert!(accuracy.rmse >= 0.0);
        assert!(accuracy.mae <= accuracy.rmse + 1e-12);
    }

    #[test]
    fn test_training_is_deterministic() {
        let (ratings, metadata) = toy_corpus();
        let a = train_model(&ratings, &metadata, &test_config()).unwrap();
        let b = train_model(&ratings, &metadata, &test_config()).unwrap();

        assert_eq!(a.factors, b.factors);
        assert_eq!(a.cf_neighbors, b.cf_neighbors);
        assert_eq!(a.content_vectors, b.content_vectors);
    }
}

//! Train a model on a synthetic corpus and run every query type.
//!
//! Run with: cargo run --package engine --example train_and_query

use anyhow::Result;
use dataset::{MovieMeta, RatingRecord};
use engine::{train_model, EngineConfig, Recommender, SimilarityMethod};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

const N_USERS: usize = 120;
const N_ITEMS: usize = 60;

/// Two taste clusters: even users favour even items, odd users odd
/// items, with noisy ratings. Metadata mirrors the clusters so content
/// similarity has signal too.
fn synthetic_tables() -> (Vec<RatingRecord>, Vec<MovieMeta>) {
    let mut rng = StdRng::seed_from_u64(11);
    let mut ratings = Vec::new();

    for user in 0..N_USERS {
        for item in 0..N_ITEMS {
            // Sparse observation: each user rates roughly half the catalogue.
            if rng.random_range(0..10) < 5 {
                continue;
            }
            let aligned = user % 2 == item % 2;
            let base = if aligned { 4.5 } else { 1.5 };
            let noise = rng.random_range(-1..=1) as f32 * 0.5;
            let rating = (base + noise).clamp(0.5, 5.0);
            ratings.push(RatingRecord::new(
                format!("user-{user:03}"),
                format!("item-{item:03}"),
                rating,
            ));
        }
    }

    let metadata = (0..N_ITEMS)
        .map(|item| {
            let (genre, synopsis) = if item % 2 == 0 {
                ("action thriller", "a relentless chase through the city at night")
            } else {
                ("drama romance", "two strangers keep meeting in a small town")
            };
            MovieMeta {
                item_id: format!("item-{item:03}"),
                title: format!("Feature #{item}"),
                year: Some(1990 + (item % 30) as u16),
                genre: genre.to_string(),
                synopsis: Some(synopsis.to_string()),
                ..Default::default()
            }
        })
        .collect();

    (ratings, metadata)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (ratings, metadata) = synthetic_tables();
    println!("corpus: {} ratings over {} items", ratings.len(), N_ITEMS);

    let config = EngineConfig {
        n_factors: 16,
        n_epochs: 25,
        holdout_fraction: 0.1,
        ..Default::default()
    }
    .with_thresholds(5, 5);

    let start = Instant::now();
    let bundle = train_model(&ratings, &metadata, &config)?;
    println!("trained in {:?}", start.elapsed());
    if let Some(accuracy) = bundle.holdout_accuracy {
        println!("holdout rmse={:.4} mae={:.4}", accuracy.rmse, accuracy.mae);
    }

    let recommender = Recommender::with_bundle(bundle);

    println!("\nCF recommendations for user-000:");
    for rec in recommender.recommend_for_user("user-000", 5)? {
        println!("  {:>9}  {:<14} predicted {:.2}", rec.item_id, rec.title, rec.score);
    }

    println!("\nitems similar to item-000 (collaborative):");
    for rec in recommender.similar_to_item("item-000", 5, SimilarityMethod::Collaborative)? {
        println!("  {:>9}  {:<14} similarity {:.3}", rec.item_id, rec.title, rec.score);
    }

    println!("\nhybrid recommendations for user-001:");
    for rec in recommender.hybrid_recommend("user-001", 5)? {
        println!("  {:>9}  {:<14} score {:.3}", rec.item_id, rec.title, rec.score);
    }

    println!("\nhybrid recommendations for a brand-new user:");
    for rec in recommender.hybrid_recommend("user-999", 3)? {
        println!(
            "  {:>9}  {:<14} score {:.3} (cold start: {})",
            rec.item_id, rec.title, rec.score, rec.flags.cold_start_fallback
        );
    }

    let mut rng = StdRng::seed_from_u64(3);
    println!("\npopular picks:");
    for rec in recommender.popular_items(3, &[], &mut rng)? {
        println!("  {:>9}  {:<14} ({} ratings)", rec.item_id, rec.title, rec.score);
    }

    Ok(())
}

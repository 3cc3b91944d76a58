//! Working-set preparation: dedup, threshold filtering, index building.
//!
//! Cold-start mitigation drops users and items with too few ratings.
//! The two thresholds feed each other: removing a sparse user can push
//! an item below its threshold, whose removal can push further users
//! below theirs. A single filtering pass is therefore not enough: the
//! filter loops until a pass removes nothing (a fixed point), with a
//! pass cap as a safety bound.
//!
//! ## Steps
//! 1. Validate rating values, deduplicate (user, item) last-write-wins
//! 2. Shrink to the fixed point of both thresholds
//! 3. Assign dense indices from the sorted surviving ids
//! 4. Build the sparse matrix and align metadata to item-index order

use crate::error::{DatasetError, Result};
use crate::matrix::RatingMatrix;
use crate::types::{EntityIndex, MovieMeta, RatingRecord};
use std::collections::HashMap;
use tracing::{debug, info};

/// Filter passes allowed before giving up on convergence. Each pass
/// strictly shrinks the entry set, so this is never hit in practice.
const MAX_FILTER_PASSES: usize = 64;

/// Everything the rest of the pipeline needs from one training run's
/// working set. Index maps and matrix dimensions are built together and
/// cannot diverge.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub matrix: RatingMatrix,
    pub users: EntityIndex,
    pub items: EntityIndex,
    /// Metadata aligned to item index order; items missing from the
    /// metadata table get a placeholder with empty content.
    pub metadata: Vec<MovieMeta>,
}

/// Filter raw tables down to a dense-enough working set.
///
/// # Arguments
/// * `ratings` - raw rating records (duplicates allowed, last wins)
/// * `metadata` - item metadata table (extra rows are ignored)
/// * `min_user_ratings` - minimum ratings a user must have given
/// * `min_item_ratings` - minimum ratings an item must have received
///
/// Fails with [`DatasetError::InsufficientData`] when the input is
/// empty or the fixed point leaves zero users or items.
pub fn prepare(
    ratings: &[RatingRecord],
    metadata: &[MovieMeta],
    min_user_ratings: usize,
    min_item_ratings: usize,
) -> Result<PreparedDataset> {
    let insufficient = |users: usize, items: usize| DatasetError::InsufficientData {
        users,
        items,
        min_user_ratings,
        min_item_ratings,
    };

    if ratings.is_empty() {
        return Err(insufficient(0, 0));
    }

    for record in ratings {
        if !record.rating.is_finite() || record.rating < 0.5 || record.rating > 5.0 {
            return Err(DatasetError::InvalidRating {
                user_id: record.user_id.clone(),
                item_id: record.item_id.clone(),
                value: record.rating,
            });
        }
    }

    // Last-write-wins dedup: a later record for the same (user, item)
    // pair supersedes an earlier one.
    let mut deduped: HashMap<(&str, &str), f32> = HashMap::new();
    for record in ratings {
        deduped.insert((&record.user_id, &record.item_id), record.rating);
    }
    debug!(
        raw = ratings.len(),
        unique = deduped.len(),
        "deduplicated rating records"
    );

    let mut entries: Vec<(&str, &str, f32)> = deduped
        .into_iter()
        .map(|((user, item), rating)| (user, item, rating))
        .collect();

    // Shrink to the fixed point of both thresholds.
    let mut passes = 0;
    loop {
        passes += 1;
        if passes > MAX_FILTER_PASSES {
            return Err(DatasetError::FilterDiverged {
                passes: MAX_FILTER_PASSES,
            });
        }

        let mut user_counts: HashMap<&str, usize> = HashMap::new();
        let mut item_counts: HashMap<&str, usize> = HashMap::new();
        for &(user, item, _) in &entries {
            *user_counts.entry(user).or_insert(0) += 1;
            *item_counts.entry(item).or_insert(0) += 1;
        }

        let before = entries.len();
        entries.retain(|&(user, item, _)| {
            user_counts[user] >= min_user_ratings && item_counts[item] >= min_item_ratings
        });

        debug!(
            pass = passes,
            before,
            after = entries.len(),
            "working-set filter pass"
        );

        if entries.len() == before {
            break;
        }
        if entries.is_empty() {
            return Err(insufficient(0, 0));
        }
    }

    // Dense index assignment from sorted surviving ids.
    let mut user_ids: Vec<String> = entries.iter().map(|&(user, _, _)| user.to_string()).collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let mut item_ids: Vec<String> = entries.iter().map(|&(_, item, _)| item.to_string()).collect();
    item_ids.sort_unstable();
    item_ids.dedup();

    if user_ids.is_empty() || item_ids.is_empty() {
        return Err(insufficient(user_ids.len(), item_ids.len()));
    }

    let users = EntityIndex::from_sorted_ids(user_ids);
    let items = EntityIndex::from_sorted_ids(item_ids);

    let triples: Vec<(u32, u32, f32)> = entries
        .iter()
        .map(|&(user, item, rating)| {
            // Both lookups must succeed: the indices were built from
            // exactly these entries.
            let u = users.index_of(user).expect("user id in index") as u32;
            let i = items.index_of(item).expect("item id in index") as u32;
            (u, i, rating)
        })
        .collect();

    let matrix = RatingMatrix::from_triples(users.len(), items.len(), &triples);
    let metadata = align_metadata(&items, metadata);

    info!(
        users = users.len(),
        items = items.len(),
        ratings = matrix.nnz(),
        passes,
        "prepared working set"
    );

    Ok(PreparedDataset {
        matrix,
        users,
        items,
        metadata,
    })
}

/// Re-order the metadata table to item index order.
///
/// Duplicate rows for an item resolve last-write-wins; items without a
/// row get a placeholder whose content text is empty, so they simply
/// contribute nothing to content similarity.
fn align_metadata(items: &EntityIndex, metadata: &[MovieMeta]) -> Vec<MovieMeta> {
    let mut by_id: HashMap<&str, &MovieMeta> = HashMap::new();
    for meta in metadata {
        by_id.insert(&meta.item_id, meta);
    }

    items
        .ids()
        .iter()
        .map(|item_id| match by_id.get(item_id.as_str()) {
            Some(meta) => (*meta).clone(),
            None => MovieMeta {
                item_id: item_id.clone(),
                title: item_id.clone(),
                ..Default::default()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user: &str, item: &str, value: f32) -> RatingRecord {
        RatingRecord::new(user, item, value)
    }

    fn meta(item: &str, title: &str) -> MovieMeta {
        MovieMeta {
            item_id: item.to_string(),
            title: title.to_string(),
            genre: "drama".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_is_insufficient() {
        let result = prepare(&[], &[], 1, 1);
        assert!(matches!(
            result,
            Err(DatasetError::InsufficientData { users: 0, items: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_rating_rejected() {
        let result = prepare(&[rating("u1", "m1", 6.0)], &[], 1, 1);
        assert!(matches!(result, Err(DatasetError::InvalidRating { .. })));
    }

    #[test]
    fn test_duplicate_pair_last_write_wins() {
        let prepared = prepare(
            &[rating("u1", "m1", 2.0), rating("u1", "m1", 4.5)],
            &[],
            1,
            1,
        )
        .unwrap();

        assert_eq!(prepared.matrix.nnz(), 1);
        assert_eq!(prepared.matrix.user_row(0).entries(), &[(0, 4.5)]);
    }

    #[test]
    fn test_indices_are_sorted_and_aligned_with_matrix() {
        let prepared = prepare(
            &[
                rating("u2", "m2", 3.0),
                rating("u1", "m1", 4.0),
                rating("u1", "m2", 5.0),
                rating("u2", "m1", 2.0),
            ],
            &[meta("m1", "First"), meta("m2", "Second")],
            1,
            1,
        )
        .unwrap();

        assert_eq!(prepared.users.ids(), &["u1", "u2"]);
        assert_eq!(prepared.items.ids(), &["m1", "m2"]);
        assert_eq!(prepared.matrix.n_users(), prepared.users.len());
        assert_eq!(prepared.matrix.n_items(), prepared.items.len());
        assert_eq!(prepared.metadata[0].title, "First");
        assert_eq!(prepared.metadata[1].title, "Second");
    }

    #[test]
    fn test_missing_metadata_gets_placeholder() {
        let prepared = prepare(
            &[rating("u1", "m1", 4.0), rating("u1", "m2", 3.0)],
            &[meta("m1", "Known")],
            1,
            1,
        )
        .unwrap();

        assert_eq!(prepared.metadata[1].item_id, "m2");
        assert_eq!(prepared.metadata[1].content_text(), "");
    }

    #[test]
    fn test_filter_cascades_to_fixed_point() {
        // Cascade case. Users A,B,C; movies X,Y,Z.
        //   A: X, Y          (2 ratings, below min 3 -> removed)
        //   B: X, Y, Z       (3 ratings)
        //   C: Y             (1 rating -> removed)
        // min_item_ratings = 2: after A and C are gone, Y has only B's
        // rating and must cascade out; B keeps X and Z only if they
        // still meet the item threshold, which they do not with a
        // single rater, so the set collapses.
        let ratings = vec![
            rating("A", "X", 4.0),
            rating("A", "Y", 3.0),
            rating("B", "X", 5.0),
            rating("B", "Y", 4.0),
            rating("B", "Z", 3.5),
            rating("C", "Y", 2.0),
        ];

        let result = prepare(&ratings, &[], 3, 2);
        assert!(matches!(
            result,
            Err(DatasetError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_filter_converges_on_mutually_satisfying_set() {
        // u1, u2 each rate m1 and m2; u3 rates only m3. With min 2/2
        // the (u1, u2) x (m1, m2) block survives and u3/m3 cascade out.
        let ratings = vec![
            rating("u1", "m1", 4.0),
            rating("u1", "m2", 3.0),
            rating("u2", "m1", 5.0),
            rating("u2", "m2", 4.0),
            rating("u3", "m3", 5.0),
        ];

        let prepared = prepare(&ratings, &[], 2, 2).unwrap();
        assert_eq!(prepared.users.ids(), &["u1", "u2"]);
        assert_eq!(prepared.items.ids(), &["m1", "m2"]);
        assert_eq!(prepared.matrix.nnz(), 4);

        // Every retained user and item satisfies both thresholds.
        for user in 0..prepared.matrix.n_users() {
            assert!(prepared.matrix.user_row(user).len() >= 2);
        }
        for item in 0..prepared.matrix.n_items() {
            assert!(prepared.matrix.item_column(item).len() >= 2);
        }
    }
}

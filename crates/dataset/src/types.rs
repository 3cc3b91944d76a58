//! Core domain types for the rating corpus.
//!
//! These are the flat records delivered by the (external) acquisition
//! layer, plus the entity index that maps string ids onto the dense
//! integer indices the numeric pipeline runs on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single observed rating.
///
/// Ratings come on a half-star scale, 0.5 through 5.0. Repeated
/// (user, item) pairs are resolved last-write-wins during preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: String,
    pub item_id: String,
    pub rating: f32,
}

impl RatingRecord {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, rating: f32) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }
}

/// One row of the item metadata table.
///
/// Only `item_id`, `title` and `genre` are required by the pipeline;
/// every other field is optional and defaults to absent rather than
/// failing ingestion. `genre` and `synopsis` together form the text
/// used for content similarity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieMeta {
    pub item_id: String,
    pub title: String,
    pub year: Option<u16>,
    pub genre: String,
    pub country: Option<String>,
    pub runtime: Option<u32>,
    pub age_rating: Option<String>,
    pub cast: Option<String>,
    pub synopsis: Option<String>,
    pub avg_score: Option<f32>,
    pub rating_count: Option<u32>,
    pub comment_count: Option<u32>,
}

impl MovieMeta {
    /// The concatenated text this item contributes to the content corpus.
    pub fn content_text(&self) -> String {
        match self.synopsis.as_deref() {
            Some(synopsis) => format!("{} {}", self.genre, synopsis),
            None => self.genre.clone(),
        }
    }
}

/// Bidirectional map between string entity ids and dense indices.
///
/// Indices are assigned once per training run from the sorted unique ids
/// of the working set and are never reused across retraining, so a
/// loaded model and the index it was trained with always agree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityIndex {
    ids: Vec<String>,
    to_index: HashMap<String, usize>,
}

impl EntityIndex {
    /// Build an index from ids that are already sorted and unique.
    pub fn from_sorted_ids(ids: Vec<String>) -> Self {
        let to_index = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        Self { ids, to_index }
    }

    /// Dense index for an id, if the id is part of the working set.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.to_index.get(id).copied()
    }

    /// Id for a dense index.
    ///
    /// Panics on out-of-range input; indices only ever come from this
    /// index or structures built against it.
    pub fn id_of(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All ids in index order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_text_joins_genre_and_synopsis() {
        let meta = MovieMeta {
            item_id: "m1".to_string(),
            title: "Test".to_string(),
            genre: "drama".to_string(),
            synopsis: Some("a quiet story".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.content_text(), "drama a quiet story");
    }

    #[test]
    fn test_content_text_without_synopsis() {
        let meta = MovieMeta {
            item_id: "m1".to_string(),
            genre: "horror".to_string(),
            ..Default::default()
        };
        assert_eq!(meta.content_text(), "horror");
    }

    #[test]
    fn test_entity_index_round_trip() {
        let index = EntityIndex::from_sorted_ids(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.index_of("b"), Some(1));
        assert_eq!(index.id_of(2), "c");
        assert_eq!(index.index_of("missing"), None);
    }
}

//! Sparse vectors and cosine similarity.
//!
//! The whole numeric pipeline runs on one vector representation: a
//! sorted list of `(index, weight)` pairs. Rating-matrix rows and
//! columns, TF-IDF vectors and user content profiles are all
//! `SparseVector`s, so similarity code is written once.
//!
//! ## Numeric Note
//! Weights are stored as `f32` (ratings and term weights fit easily),
//! but dot products and norms accumulate in `f64` and similarity scores
//! are returned as `f64` to keep ranking stable for near-tied items.

use serde::{Deserialize, Serialize};

/// A sparse vector as sorted `(index, weight)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries in arbitrary order.
    ///
    /// Entries are sorted by index; a duplicate index keeps the last
    /// value seen, matching the last-write-wins rule used elsewhere.
    pub fn from_entries(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_by_key(|&(idx, _)| idx);
        entries.dedup_by(|later, earlier| {
            if later.0 == earlier.0 {
                earlier.1 = later.1;
                true
            } else {
                false
            }
        });
        Self { entries }
    }

    /// Build from entries already sorted by strictly increasing index.
    pub fn from_sorted_entries(entries: Vec<(u32, f32)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product via sorted-merge over the two entry lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let a = &self.entries;
        let b = &other.entries;
        let mut sum = 0.0f64;

        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 as f64 * b[j].1 as f64;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, w)| (w as f64) * (w as f64))
            .sum::<f64>()
            .sqrt()
    }

    /// Cosine similarity; 0.0 when either vector is all zeros.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }

    /// Scale every weight so the vector has unit norm.
    ///
    /// A zero vector is left untouched.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 {
            return;
        }
        for entry in &mut self.entries {
            entry.1 = (entry.1 as f64 / norm) as f32;
        }
    }

    /// Element-wise mean of a set of vectors (the "content profile" of
    /// a user is the mean of the vectors of the items they rated).
    ///
    /// Returns an empty vector for an empty input set.
    pub fn mean<'a>(vectors: impl Iterator<Item = &'a SparseVector>) -> SparseVector {
        let mut sums: std::collections::HashMap<u32, f64> = std::collections::HashMap::new();
        let mut count = 0usize;

        for vector in vectors {
            count += 1;
            for &(idx, weight) in &vector.entries {
                *sums.entry(idx).or_insert(0.0) += weight as f64;
            }
        }
        if count == 0 {
            return SparseVector::new();
        }

        let mut entries: Vec<(u32, f32)> = sums
            .into_iter()
            .map(|(idx, sum)| (idx, (sum / count as f64) as f32))
            .collect();
        entries.sort_by_key(|&(idx, _)| idx);
        SparseVector { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_over_disjoint_indices_is_zero() {
        let a = SparseVector::from_entries(vec![(0, 1.0), (2, 3.0)]);
        let b = SparseVector::from_entries(vec![(1, 4.0), (3, 5.0)]);
        assert_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn test_cosine_of_parallel_vectors_is_one() {
        let a = SparseVector::from_entries(vec![(0, 1.0), (1, 2.0)]);
        let b = SparseVector::from_entries(vec![(0, 2.0), (1, 4.0)]);
        assert!((a.cosine(&b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_handles_zero_vector() {
        let a = SparseVector::new();
        let b = SparseVector::from_entries(vec![(0, 1.0)]);
        assert_eq!(a.cosine(&b), 0.0);
    }

    #[test]
    fn test_from_entries_last_write_wins() {
        let v = SparseVector::from_entries(vec![(1, 1.0), (0, 2.0), (1, 3.0)]);
        assert_eq!(v.entries(), &[(0, 2.0), (1, 3.0)]);
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = SparseVector::from_entries(vec![(0, 3.0), (1, 4.0)]);
        v.l2_normalize();
        assert!((v.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_of_two_vectors() {
        let a = SparseVector::from_entries(vec![(0, 2.0), (1, 4.0)]);
        let b = SparseVector::from_entries(vec![(1, 2.0), (2, 6.0)]);
        let mean = SparseVector::mean([&a, &b].into_iter());
        assert_eq!(mean.entries(), &[(0, 1.0), (1, 3.0), (2, 3.0)]);
    }

    #[test]
    fn test_mean_of_nothing_is_empty() {
        let mean = SparseVector::mean(std::iter::empty());
        assert!(mean.is_empty());
    }
}

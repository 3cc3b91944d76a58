//! The sparse user×item rating matrix.
//!
//! No dense |users|×|items| allocation ever exists: the matrix keeps
//! the observed entries twice, once user-major (rows) and once
//! item-major (columns), both as [`SparseVector`]s. Rows drive the
//! factor trainer and candidate exclusion; columns are the rating
//! vectors that collaborative item similarity compares.
//!
//! The shape is fixed at construction. Retraining builds a fresh matrix
//! from a fresh working set rather than mutating in place, so any
//! structure derived from a matrix snapshot stays consistent with it.

use crate::vector::SparseVector;
use serde::{Deserialize, Serialize};

/// One observed rating in dense-index space.
pub type RatingTriple = (u32, u32, f32);

/// Sparse user×item matrix with dual adjacency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingMatrix {
    rows: Vec<SparseVector>,
    columns: Vec<SparseVector>,
    nnz: usize,
}

impl RatingMatrix {
    /// Build from observed `(user, item, rating)` triples.
    ///
    /// Triples must reference indices below the given dimensions;
    /// duplicates must already be resolved by the caller.
    pub fn from_triples(n_users: usize, n_items: usize, triples: &[RatingTriple]) -> Self {
        let mut rows: Vec<Vec<(u32, f32)>> = vec![Vec::new(); n_users];
        let mut columns: Vec<Vec<(u32, f32)>> = vec![Vec::new(); n_items];

        for &(user, item, rating) in triples {
            rows[user as usize].push((item, rating));
            columns[item as usize].push((user, rating));
        }

        let rows = rows.into_iter().map(SparseVector::from_entries).collect();
        let columns = columns.into_iter().map(SparseVector::from_entries).collect();

        Self {
            rows,
            columns,
            nnz: triples.len(),
        }
    }

    pub fn n_users(&self) -> usize {
        self.rows.len()
    }

    pub fn n_items(&self) -> usize {
        self.columns.len()
    }

    /// Number of observed entries.
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Ratings given by one user, as `(item, rating)` pairs.
    pub fn user_row(&self, user: usize) -> &SparseVector {
        &self.rows[user]
    }

    /// Ratings received by one item, as `(user, rating)` pairs.
    pub fn item_column(&self, item: usize) -> &SparseVector {
        &self.columns[item]
    }

    /// All item columns, in index order.
    pub fn item_columns(&self) -> &[SparseVector] {
        &self.columns
    }

    /// Mean of all observed ratings; 0.0 for an empty matrix.
    pub fn global_mean(&self) -> f64 {
        if self.nnz == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .rows
            .iter()
            .flat_map(|row| row.entries())
            .map(|&(_, rating)| rating as f64)
            .sum();
        sum / self.nnz as f64
    }

    /// Every observed entry as `(user, item, rating)` triples, in
    /// row-major order. The trainer shuffles these per epoch.
    pub fn triples(&self) -> Vec<RatingTriple> {
        let mut out = Vec::with_capacity(self.nnz);
        for (user, row) in self.rows.iter().enumerate() {
            for &(item, rating) in row.entries() {
                out.push((user as u32, item, rating));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_matrix() -> RatingMatrix {
        // 2 users x 3 items
        RatingMatrix::from_triples(
            2,
            3,
            &[(0, 0, 5.0), (0, 2, 1.0), (1, 0, 4.0), (1, 1, 2.5)],
        )
    }

    #[test]
    fn test_shape_and_nnz() {
        let m = small_matrix();
        assert_eq!(m.n_users(), 2);
        assert_eq!(m.n_items(), 3);
        assert_eq!(m.nnz(), 4);
    }

    #[test]
    fn test_rows_and_columns_agree() {
        let m = small_matrix();
        assert_eq!(m.user_row(0).entries(), &[(0, 5.0), (2, 1.0)]);
        assert_eq!(m.item_column(0).entries(), &[(0, 5.0), (1, 4.0)]);
        // Item 1 rated by user 1 only.
        assert_eq!(m.item_column(1).entries(), &[(1, 2.5)]);
    }

    #[test]
    fn test_global_mean() {
        let m = small_matrix();
        let expected = (5.0 + 1.0 + 4.0 + 2.5) / 4.0;
        assert!((m.global_mean() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_triples_round_trip() {
        let m = small_matrix();
        let rebuilt = RatingMatrix::from_triples(2, 3, &m.triples());
        assert_eq!(m, rebuilt);
    }
}

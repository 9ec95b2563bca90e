use super::catalog_matrix::CatalogMatrix;
use ndarray::{Array1, ArrayView1};
use std::cmp::Ordering;

/// Cosine similarity of `query` against every catalog row.
///
/// Zero-norm vectors score 0 against everything.
pub fn cosine_scores(matrix: &CatalogMatrix, query: ArrayView1<'_, f64>) -> Array1<f64> {
    let query_norm = query.dot(&query).sqrt();
    let mut scores = matrix.dot(query);

    for (row, score) in scores.iter_mut().enumerate() {
        let denom = query_norm * matrix.row_norm(row);
        *score = if denom > 0.0 {
            (*score / denom).clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }

    scores
}

/// Indices of the `k` highest scores, descending.
///
/// Equal scores keep ascending index order, so results are reproducible.
pub fn top_k_indices(scores: ArrayView1<'_, f64>, k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    let by_score = |a: &usize, b: &usize| -> Ordering {
        scores[*b].total_cmp(&scores[*a]).then_with(|| a.cmp(b))
    };

    let k = k.min(indices.len());
    if k == 0 {
        return Vec::new();
    }
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, by_score);
        indices.truncate(k);
    }
    indices.sort_unstable_by(by_score);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_scores() {
        let matrix =
            CatalogMatrix::from_dense(vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]])
                .unwrap();
        let scores = cosine_scores(&matrix, array![2.0, 0.0].view());

        assert!((scores[0] - 1.0).abs() < 1e-12);
        assert!((scores[1] - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let matrix = CatalogMatrix::from_dense(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let scores = cosine_scores(&matrix, array![0.0, 0.0].view());
        assert_eq!(scores.to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_top_k_orders_descending() {
        let scores = array![0.1, 0.9, 0.5, 0.7];
        assert_eq!(top_k_indices(scores.view(), 3), vec![1, 3, 2]);
    }

    #[test]
    fn test_top_k_ties_break_by_ascending_index() {
        let scores = array![0.5, 0.9, 0.5, 0.5, 0.9];
        assert_eq!(top_k_indices(scores.view(), 5), vec![1, 4, 0, 2, 3]);
        assert_eq!(top_k_indices(scores.view(), 3), vec![1, 4, 0]);
    }

    #[test]
    fn test_top_k_clamps_to_len() {
        let scores = array![0.2, 0.1];
        assert_eq!(top_k_indices(scores.view(), 1000), vec![0, 1]);
        assert!(top_k_indices(scores.view(), 0).is_empty());
    }
}

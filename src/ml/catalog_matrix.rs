//! Precomputed catalog feature matrix.
//!
//! Rows are stored in compressed sparse row layout since TF-IDF rows are
//! mostly zeros. Dense artifacts are compressed on load.

use crate::error::{ApiError, Result};
use ndarray::{Array1, ArrayView1};
use serde::Deserialize;

/// Serialized form of the matrix, tagged by layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum CatalogMatrixArtifact {
    Csr {
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    },
    Dense {
        rows: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Clone)]
pub struct CatalogMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
    row_norms: Array1<f64>,
}

impl CatalogMatrix {
    pub fn from_artifact(artifact: CatalogMatrixArtifact) -> Result<Self> {
        match artifact {
            CatalogMatrixArtifact::Csr {
                shape,
                indptr,
                indices,
                data,
            } => Self::from_csr(shape, indptr, indices, data),
            CatalogMatrixArtifact::Dense { rows } => Self::from_dense(rows),
        }
    }

    /// Build from dense rows; every row must have the same width.
    pub fn from_dense(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ApiError::ConfigError(format!(
                    "dense row {} has {} columns, expected {}",
                    row_idx,
                    row.len(),
                    cols
                )));
            }
            for (col, &value) in row.iter().enumerate() {
                if value != 0.0 {
                    indices.push(col);
                    data.push(value);
                }
            }
            indptr.push(data.len());
        }

        Self::from_csr((rows.len(), cols), indptr, indices, data)
    }

    pub fn from_csr(
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        let (rows, cols) = shape;

        let expected_indptr = rows.checked_add(1).ok_or_else(|| {
            ApiError::ConfigError(format!("row count {} is too large", rows))
        })?;
        if indptr.len() != expected_indptr {
            return Err(ApiError::ConfigError(format!(
                "indptr has {} entries, expected {} for {} rows",
                indptr.len(),
                expected_indptr,
                rows
            )));
        }
        if indices.len() != data.len() {
            return Err(ApiError::ConfigError(format!(
                "indices ({}) and data ({}) lengths differ",
                indices.len(),
                data.len()
            )));
        }
        if indptr[0] != 0 || indptr[rows] != data.len() {
            return Err(ApiError::ConfigError(
                "indptr must start at 0 and end at the number of stored values".to_string(),
            ));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(ApiError::ConfigError(
                "indptr must be non-decreasing".to_string(),
            ));
        }
        if let Some(&col) = indices.iter().find(|&&col| col >= cols) {
            return Err(ApiError::ConfigError(format!(
                "column index {} out of range for width {}",
                col, cols
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ApiError::ConfigError(
                "matrix contains non-finite values".to_string(),
            ));
        }

        let (indptr, indices, data) = sum_duplicates(rows, &indptr, &indices, &data);

        let row_norms = (0..rows)
            .map(|row| {
                data[indptr[row]..indptr[row + 1]]
                    .iter()
                    .map(|v| v * v)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect::<Array1<f64>>();

        Ok(Self {
            rows,
            cols,
            indptr,
            indices,
            data,
            row_norms,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored non-zero values
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn row_norm(&self, row: usize) -> f64 {
        self.row_norms[row]
    }

    /// Dot product of every row with `vector`; `vector.len()` must equal `cols`.
    pub fn dot(&self, vector: ArrayView1<'_, f64>) -> Array1<f64> {
        debug_assert_eq!(vector.len(), self.cols);
        (0..self.rows)
            .map(|row| {
                let span = self.indptr[row]..self.indptr[row + 1];
                self.indices[span.clone()]
                    .iter()
                    .zip(&self.data[span])
                    .map(|(&col, &value)| value * vector[col])
                    .sum::<f64>()
            })
            .collect()
    }
}

/// Sort each row by column and add up repeated column entries, so norms
/// and dot products see the same row.
fn sum_duplicates(
    rows: usize,
    indptr: &[usize],
    indices: &[usize],
    data: &[f64],
) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
    let mut merged_indptr = Vec::with_capacity(rows + 1);
    let mut merged_indices = Vec::with_capacity(indices.len());
    let mut merged_data = Vec::with_capacity(data.len());
    merged_indptr.push(0);

    for row in 0..rows {
        let span = indptr[row]..indptr[row + 1];
        let mut entries: Vec<(usize, f64)> = indices[span.clone()]
            .iter()
            .copied()
            .zip(data[span].iter().copied())
            .collect();
        entries.sort_by_key(|&(col, _)| col);

        let row_start = merged_indices.len();
        for (col, value) in entries {
            if merged_indices.len() > row_start && merged_indices.last() == Some(&col) {
                if let Some(last) = merged_data.last_mut() {
                    *last += value;
                }
            } else {
                merged_indices.push(col);
                merged_data.push(value);
            }
        }
        merged_indptr.push(merged_indices.len());
    }

    (merged_indptr, merged_indices, merged_data)
}

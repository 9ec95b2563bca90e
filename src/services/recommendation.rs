use crate::error::{ApiError, Result};
use crate::ml::{similarity, CatalogMatrix, FeatureEncoder, Field};
use crate::models::{CatalogStats, RecipeQuery, Recommendation};
use crate::services::artifacts::{load_artifacts, ArtifactPaths};
use tracing::{debug, info};

/// Ranks catalog recipes against a query.
///
/// Holds the recipe names, the four feature models and the precomputed
/// catalog matrix. Everything is immutable after construction, so one
/// instance is shared by all request handlers without locking.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    names: Vec<String>,
    encoder: FeatureEncoder,
    matrix: CatalogMatrix,
}

impl RecommendationService {
    /// Cross-check the artifacts and build a ready service.
    ///
    /// Fails with `ApiError::ConfigError` when the catalog is empty, when the
    /// name list and matrix disagree on the number of recipes, or when the
    /// feature models do not add up to the matrix width.
    pub fn initialize(
        names: Vec<String>,
        encoder: FeatureEncoder,
        matrix: CatalogMatrix,
    ) -> Result<Self> {
        if matrix.rows() == 0 || names.is_empty() {
            return Err(ApiError::ConfigError("catalog is empty".to_string()));
        }

        if names.len() != matrix.rows() {
            return Err(ApiError::ConfigError(format!(
                "name list has {} entries but feature matrix has {} rows",
                names.len(),
                matrix.rows()
            )));
        }

        if encoder.width() != matrix.cols() {
            let widths = Field::ALL
                .iter()
                .map(|field| format!("{}={}", field, encoder.field_width(*field)))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ApiError::ConfigError(format!(
                "feature models produce {} columns ({}) but feature matrix has {}",
                encoder.width(),
                widths,
                matrix.cols()
            )));
        }

        info!(
            "Recommendation service ready: {} recipes, {} feature columns",
            names.len(),
            matrix.cols()
        );

        Ok(Self {
            names,
            encoder,
            matrix,
        })
    }

    /// Read all artifacts from disk and initialize.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let artifacts = load_artifacts(paths)?;
        Self::initialize(artifacts.names, artifacts.encoder, artifacts.matrix)
    }

    /// Number of recipes in the catalog
    pub fn catalog_size(&self) -> usize {
        self.names.len()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            entries: self.catalog_size(),
            feature_width: self.matrix.cols(),
            stored_values: self.matrix.nnz(),
            field_widths: Field::ALL
                .iter()
                .map(|field| (field.to_string(), self.encoder.field_width(*field)))
                .collect(),
        }
    }

    /// Return the `min(top_k, catalog_size)` recipes most similar to `query`.
    ///
    /// Any query text is accepted. Results are ordered by descending score;
    /// equal scores are ordered by catalog position.
    pub fn rank(&self, query: &RecipeQuery, top_k: usize) -> Result<Vec<Recommendation>> {
        let query_vector = self.encoder.encode_query(query);
        if query_vector.len() != self.matrix.cols() {
            return Err(ApiError::ConfigError(format!(
                "query vector has {} columns but feature matrix has {}",
                query_vector.len(),
                self.matrix.cols()
            )));
        }

        let scores = similarity::cosine_scores(&self.matrix, query_vector.view());
        let top = similarity::top_k_indices(scores.view(), top_k);

        let recommendations: Vec<Recommendation> = top
            .into_iter()
            .map(|idx| Recommendation::new(self.names[idx].clone(), scores[idx]))
            .collect();

        debug!(
            "Ranked {} recipes for ingredients '{}', top result: {:?}",
            recommendations.len(),
            query.ingredients,
            recommendations.first().map(|r| &r.name)
        );

        Ok(recommendations)
    }
}

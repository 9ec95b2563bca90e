use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use recipe::{RecipeQuery, Recommendation};

mod recipe;

/// Request structure for recipe recommendations, accepted as JSON or form data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Free-text ingredient list, e.g. "tomato paneer"
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub diet: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub region: String,
    /// Number of recommendations to return; the configured default when absent
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl RecommendationRequest {
    pub fn query(&self) -> RecipeQuery {
        RecipeQuery {
            ingredients: self.ingredients.clone(),
            diet: self.diet.clone(),
            course: self.course.clone(),
            region: self.region.clone(),
        }
    }
}

/// Response structure for recipe recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
}

/// Shape of the loaded catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    pub entries: usize,
    pub feature_width: usize,
    pub stored_values: usize,
    pub field_widths: BTreeMap<String, usize>,
}

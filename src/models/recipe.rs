use crate::ml::Field;
use serde::{Deserialize, Serialize};

/// The four free-text fields a recommendation is computed from.
///
/// Any string is valid, including the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub diet: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub region: String,
}

impl RecipeQuery {
    pub fn from_ingredients(ingredients: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into(),
            ..Self::default()
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Ingredients => &self.ingredients,
            Field::Diet => &self.diet,
            Field::Course => &self.course,
            Field::Region => &self.region,
        }
    }
}

/// A ranked catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    /// Cosine similarity scaled to 0-100, rounded to 2 decimals
    pub similarity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Recommendation {
    pub fn new(name: impl Into<String>, similarity: f64) -> Self {
        Self {
            name: name.into(),
            similarity_score: scale_score(similarity),
            image_url: None,
        }
    }
}

fn scale_score(similarity: f64) -> f64 {
    (similarity * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_percentage_with_two_decimals() {
        assert_eq!(Recommendation::new("Dal Tadka", 0.123456).similarity_score, 12.35);
        assert_eq!(Recommendation::new("Dal Tadka", 1.0).similarity_score, 100.0);
        assert_eq!(Recommendation::new("Dal Tadka", 0.0).similarity_score, 0.0);
    }

    #[test]
    fn test_image_url_omitted_when_absent() {
        let json = serde_json::to_value(Recommendation::new("Veg Pulao", 0.5)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Veg Pulao", "similarity_score": 50.0}));
    }
}

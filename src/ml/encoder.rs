use super::tfidf::FeatureModel;
use crate::models::RecipeQuery;
use ndarray::{s, Array1};
use std::fmt;
use std::ops::Range;

/// Request fields, in the column order of the catalog feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ingredients,
    Diet,
    Course,
    Region,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Ingredients, Field::Diet, Field::Course, Field::Region];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Ingredients => "ingredients",
            Field::Diet => "diet",
            Field::Course => "course",
            Field::Region => "region",
        }
    }

    fn position(&self) -> usize {
        match self {
            Field::Ingredients => 0,
            Field::Diet => 1,
            Field::Course => 2,
            Field::Region => 3,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four per-field feature models, concatenated in `Field::ALL` order.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    models: [FeatureModel; 4],
}

impl FeatureEncoder {
    pub fn new(
        ingredients: FeatureModel,
        diet: FeatureModel,
        course: FeatureModel,
        region: FeatureModel,
    ) -> Self {
        Self {
            models: [ingredients, diet, course, region],
        }
    }

    pub fn model(&self, field: Field) -> &FeatureModel {
        &self.models[field.position()]
    }

    pub fn field_width(&self, field: Field) -> usize {
        self.model(field).width()
    }

    /// Total width of a query vector
    pub fn width(&self) -> usize {
        self.models.iter().map(FeatureModel::width).sum()
    }

    /// Column range a field occupies inside the concatenated vector
    pub fn field_range(&self, field: Field) -> Range<usize> {
        let start: usize = self.models[..field.position()]
            .iter()
            .map(FeatureModel::width)
            .sum();
        start..start + self.field_width(field)
    }

    pub fn encode(&self, field: Field, text: &str) -> Array1<f64> {
        self.model(field).transform(text)
    }

    /// Encode every field and concatenate them into one query vector.
    pub fn encode_query(&self, query: &RecipeQuery) -> Array1<f64> {
        let mut vector = Array1::<f64>::zeros(self.width());
        for field in Field::ALL {
            let range = self.field_range(field);
            vector
                .slice_mut(s![range.start..range.end])
                .assign(&self.encode(field, query.field(field)));
        }
        vector
    }
}

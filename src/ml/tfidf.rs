//! Fitted TF-IDF feature model.
//!
//! A `FeatureModel` is built once from an exported artifact and then only
//! transforms text. Fitting happens offline; this module never learns a
//! vocabulary, it only validates and applies one.

use crate::error::{ApiError, Result};
use ndarray::Array1;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

static DEFAULT_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Serialized form of a fitted model, as exported next to the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureModelArtifact {
    pub vocabulary: HashMap<String, usize>,
    #[serde(default)]
    pub idf: Vec<f64>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub token_pattern: Option<String>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default = "default_true")]
    pub use_idf: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

impl FeatureModelArtifact {
    /// Artifact with default vectorizer settings over the given vocabulary.
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Self {
        Self {
            vocabulary,
            idf,
            lowercase: true,
            token_pattern: None,
            ngram_range: default_ngram_range(),
            stop_words: Vec::new(),
            binary: false,
            use_idf: true,
            sublinear_tf: false,
            norm: default_norm(),
        }
    }
}

/// Immutable text-to-vector transform over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct FeatureModel {
    vocabulary: HashMap<String, usize>,
    idf: Option<Array1<f64>>,
    lowercase: bool,
    token_regex: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl FeatureModel {
    /// Validate an artifact and build the transform.
    ///
    /// The vocabulary must map onto exactly `0..width`, otherwise vectors from
    /// this model could not line up with the catalog matrix columns.
    pub fn from_artifact(artifact: FeatureModelArtifact) -> Result<Self> {
        let width = artifact.vocabulary.len();

        let mut seen = vec![false; width];
        for (term, &idx) in &artifact.vocabulary {
            if idx >= width || seen[idx] {
                return Err(ApiError::ConfigError(format!(
                    "vocabulary index {} for term '{}' is out of range or duplicated (width {})",
                    idx, term, width
                )));
            }
            seen[idx] = true;
        }

        let idf = if artifact.use_idf {
            if artifact.idf.len() != width {
                return Err(ApiError::ConfigError(format!(
                    "idf has {} weights but vocabulary has {} terms",
                    artifact.idf.len(),
                    width
                )));
            }
            if artifact.idf.iter().any(|w| !w.is_finite()) {
                return Err(ApiError::ConfigError(
                    "idf contains non-finite weights".to_string(),
                ));
            }
            Some(Array1::from(artifact.idf))
        } else {
            None
        };

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ApiError::ConfigError(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let token_regex = match artifact.token_pattern.as_deref() {
            None | Some(DEFAULT_TOKEN_PATTERN) => DEFAULT_TOKEN_REGEX.clone(),
            Some(pattern) => Regex::new(pattern).map_err(|e| {
                ApiError::ConfigError(format!("invalid token_pattern '{}': {}", pattern, e))
            })?,
        };

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf,
            lowercase: artifact.lowercase,
            token_regex,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            binary: artifact.binary,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    /// Output width, equal to the vocabulary size
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Map `text` onto this model's vocabulary.
    ///
    /// Never fails: empty input and unseen tokens yield zero weights, and the
    /// result always has `self.width()` entries.
    pub fn transform(&self, text: &str) -> Array1<f64> {
        let mut vector = Array1::<f64>::zeros(self.width());

        for term in self.analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                vector[idx] += 1.0;
            }
        }

        if self.binary {
            vector.mapv_inplace(|tf| if tf > 0.0 { 1.0 } else { 0.0 });
        }

        if self.sublinear_tf {
            vector.mapv_inplace(|tf| if tf > 0.0 { 1.0 + tf.ln() } else { 0.0 });
        }

        if let Some(idf) = &self.idf {
            vector *= idf;
        }

        let norm = match self.norm {
            Some(Norm::L2) => vector.dot(&vector).sqrt(),
            Some(Norm::L1) => vector.iter().map(|v| v.abs()).sum(),
            None => 0.0,
        };
        if norm > 0.0 {
            vector /= norm;
        }

        vector
    }

    /// Produce the n-gram terms for `text` in document order.
    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens = self.tokenize(&text);

        let (min_n, max_n) = self.ngram_range;
        if min_n == 1 && max_n == 1 {
            return tokens.into_iter().map(str::to_string).collect();
        }

        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // A capture group in the pattern selects the token
        let tokens: Vec<&'a str> = if self.token_regex.captures_len() > 1 {
            self.token_regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_regex
                .find_iter(text)
                .map(|m| m.as_str())
                .collect()
        };

        tokens
            .into_iter()
            .filter(|token| !self.stop_words.contains(*token))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary(terms: &[&str]) -> HashMap<String, usize> {
        terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect()
    }

    fn model(terms: &[&str]) -> FeatureModel {
        let artifact = FeatureModelArtifact::new(vocabulary(terms), vec![1.0; terms.len()]);
        FeatureModel::from_artifact(artifact).unwrap()
    }

    #[test]
    fn test_empty_input_gives_zero_vector() {
        let model = model(&["paneer", "tomato", "cream"]);
        let vector = model.transform("");

        assert_eq!(vector.len(), 3);
        assert!(vector.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unseen_tokens_are_ignored() {
        let model = model(&["paneer", "tomato"]);
        let vector = model.transform("xyzzynotarealword ###");

        assert_eq!(vector.len(), 2);
        assert!(vector.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_l2_normalized_with_idf_weights() {
        let artifact =
            FeatureModelArtifact::new(vocabulary(&["paneer", "tomato"]), vec![2.0, 1.0]);
        let model = FeatureModel::from_artifact(artifact).unwrap();

        let vector = model.transform("Tomato PANEER tomato");
        // tf = [1, 2], weighted = [2, 2]
        let expected = 1.0 / 2f64.sqrt();
        assert!((vector[0] - expected).abs() < 1e-12);
        assert!((vector[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_single_character_tokens_are_dropped() {
        let model = model(&["a", "dal"]);
        let vector = model.transform("a dal");

        assert_eq!(vector[0], 0.0);
        assert_eq!(vector[1], 1.0);
    }

    #[test]
    fn test_bigrams_and_stop_words() {
        let mut artifact = FeatureModelArtifact::new(
            vocabulary(&["main", "course", "main course"]),
            vec![1.0; 3],
        );
        artifact.ngram_range = (1, 2);
        artifact.stop_words = vec!["the".to_string()];
        artifact.norm = None;
        let model = FeatureModel::from_artifact(artifact).unwrap();

        let vector = model.transform("the main course");
        assert_eq!(vector.to_vec(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_custom_pattern_with_capture_group() {
        let mut artifact = FeatureModelArtifact::new(vocabulary(&["spicy", "sweet"]), vec![1.0; 2]);
        artifact.token_pattern = Some(r"#(\w+)".to_string());
        artifact.norm = None;
        let model = FeatureModel::from_artifact(artifact).unwrap();

        let vector = model.transform("#spicy sweet");
        assert_eq!(vector.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_sublinear_and_binary_counts() {
        let mut artifact = FeatureModelArtifact::new(vocabulary(&["rice"]), vec![1.0]);
        artifact.norm = None;
        artifact.sublinear_tf = true;
        let sublinear = FeatureModel::from_artifact(artifact.clone()).unwrap();
        assert!((sublinear.transform("rice rice rice")[0] - (1.0 + 3f64.ln())).abs() < 1e-12);

        artifact.sublinear_tf = false;
        artifact.binary = true;
        let binary = FeatureModel::from_artifact(artifact).unwrap();
        assert_eq!(binary.transform("rice rice rice")[0], 1.0);
    }

    #[test]
    fn test_rejects_gapped_vocabulary() {
        let mut vocab = vocabulary(&["paneer"]);
        vocab.insert("tomato".to_string(), 5);
        let artifact = FeatureModelArtifact::new(vocab, vec![1.0, 1.0]);

        assert!(matches!(
            FeatureModel::from_artifact(artifact),
            Err(ApiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_idf_length_mismatch() {
        let artifact = FeatureModelArtifact::new(vocabulary(&["paneer", "tomato"]), vec![1.0]);
        assert!(FeatureModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_rejects_bad_token_pattern() {
        let mut artifact = FeatureModelArtifact::new(vocabulary(&["paneer"]), vec![1.0]);
        artifact.token_pattern = Some("(unclosed".to_string());
        assert!(FeatureModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let json = r#"{"vocabulary": {"vegetarian": 0, "vegan": 1}, "idf": [1.2, 1.5]}"#;
        let artifact: FeatureModelArtifact = serde_json::from_str(json).unwrap();

        assert!(artifact.lowercase);
        assert_eq!(artifact.norm, Some(Norm::L2));
        assert_eq!(artifact.ngram_range, (1, 1));

        let model = FeatureModel::from_artifact(artifact).unwrap();
        assert_eq!(model.width(), 2);
        assert_eq!(model.transform("Vegan")[1], 1.0);
    }
}

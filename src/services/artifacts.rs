//! Start-up loading of the exported catalog artifacts.

use crate::error::{ApiError, Result};
use crate::ml::{
    CatalogMatrix, CatalogMatrixArtifact, FeatureEncoder, FeatureModel, FeatureModelArtifact,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const NAMES_FILE: &str = "recipe_names.json";
const INGREDIENTS_MODEL_FILE: &str = "tfidf_ingredients.json";
const DIET_MODEL_FILE: &str = "tfidf_diet.json";
const COURSE_MODEL_FILE: &str = "tfidf_course.json";
const REGION_MODEL_FILE: &str = "tfidf_region.json";
const FEATURES_FILE: &str = "input_features.json";

/// Locations of every artifact the recommender needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub names: PathBuf,
    pub ingredients_model: PathBuf,
    pub diet_model: PathBuf,
    pub course_model: PathBuf,
    pub region_model: PathBuf,
    pub features: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            names: dir.join(NAMES_FILE),
            ingredients_model: dir.join(INGREDIENTS_MODEL_FILE),
            diet_model: dir.join(DIET_MODEL_FILE),
            course_model: dir.join(COURSE_MODEL_FILE),
            region_model: dir.join(REGION_MODEL_FILE),
            features: dir.join(FEATURES_FILE),
        }
    }
}

/// Artifacts parsed and individually validated, not yet cross-checked.
pub struct LoadedArtifacts {
    pub names: Vec<String>,
    pub encoder: FeatureEncoder,
    pub matrix: CatalogMatrix,
}

pub fn load_artifacts(paths: &ArtifactPaths) -> Result<LoadedArtifacts> {
    info!("Loading catalog artifacts...");

    let names: Vec<String> = read_json(&paths.names)?;
    debug!("Loaded {} recipe names", names.len());

    let encoder = FeatureEncoder::new(
        load_model(&paths.ingredients_model)?,
        load_model(&paths.diet_model)?,
        load_model(&paths.course_model)?,
        load_model(&paths.region_model)?,
    );

    let matrix_artifact: CatalogMatrixArtifact = read_json(&paths.features)?;
    let matrix = CatalogMatrix::from_artifact(matrix_artifact)
        .map_err(|e| with_path(&paths.features, e))?;
    debug!(
        "Loaded catalog matrix {}x{} with {} stored values",
        matrix.rows(),
        matrix.cols(),
        matrix.nnz()
    );

    Ok(LoadedArtifacts {
        names,
        encoder,
        matrix,
    })
}

fn load_model(path: &Path) -> Result<FeatureModel> {
    let artifact: FeatureModelArtifact = read_json(path)?;
    let model = FeatureModel::from_artifact(artifact).map_err(|e| with_path(path, e))?;
    debug!("Loaded feature model {} ({} terms)", path.display(), model.width());
    Ok(model)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ApiError::ConfigError(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        ApiError::ConfigError(format!("malformed artifact {}: {}", path.display(), e))
    })
}

fn with_path(path: &Path, err: ApiError) -> ApiError {
    match err {
        ApiError::ConfigError(msg) => {
            ApiError::ConfigError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("recipe-artifacts-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, file: &str, contents: &str) {
        fs::write(dir.join(file), contents).unwrap();
    }

    fn write_valid_set(dir: &Path) {
        write(dir, NAMES_FILE, r#"["Paneer Curry", "Veg Pulao"]"#);
        write(
            dir,
            INGREDIENTS_MODEL_FILE,
            r#"{"vocabulary": {"paneer": 0, "rice": 1}, "idf": [1.4, 1.4]}"#,
        );
        write(dir, DIET_MODEL_FILE, r#"{"vocabulary": {"vegetarian": 0}, "idf": [1.0]}"#);
        write(dir, COURSE_MODEL_FILE, r#"{"vocabulary": {"main": 0}, "idf": [1.0]}"#);
        write(dir, REGION_MODEL_FILE, r#"{"vocabulary": {"punjabi": 0}, "idf": [1.0]}"#);
        write(
            dir,
            FEATURES_FILE,
            r#"{"format": "dense", "rows": [[1, 0, 1, 1, 1], [0, 1, 1, 0, 0]]}"#,
        );
    }

    #[test]
    fn test_in_dir_uses_default_file_names() {
        let paths = ArtifactPaths::in_dir("/srv/artifacts");
        assert_eq!(paths.names, PathBuf::from("/srv/artifacts/recipe_names.json"));
        assert_eq!(
            paths.features,
            PathBuf::from("/srv/artifacts/input_features.json")
        );
    }

    #[test]
    fn test_loads_valid_artifacts() {
        let dir = temp_dir();
        write_valid_set(&dir);

        let loaded = load_artifacts(&ArtifactPaths::in_dir(&dir)).unwrap();
        assert_eq!(loaded.names, vec!["Paneer Curry", "Veg Pulao"]);
        assert_eq!(loaded.encoder.width(), 5);
        assert_eq!((loaded.matrix.rows(), loaded.matrix.cols()), (2, 5));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = temp_dir();
        write_valid_set(&dir);
        fs::remove_file(dir.join(DIET_MODEL_FILE)).unwrap();

        let err = load_artifacts(&ArtifactPaths::in_dir(&dir))
            .err()
            .expect("missing diet model should fail");
        assert!(matches!(err, ApiError::ConfigError(ref msg) if msg.contains(DIET_MODEL_FILE)));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = temp_dir();
        write_valid_set(&dir);
        write(&dir, FEATURES_FILE, r#"{"format": "coo"}"#);

        let result = load_artifacts(&ArtifactPaths::in_dir(&dir));
        assert!(matches!(result, Err(ApiError::ConfigError(_))));

        fs::remove_dir_all(dir).ok();
    }
}

pub mod catalog_matrix;
pub mod encoder;
pub mod similarity;
pub mod tfidf;

pub use catalog_matrix::{CatalogMatrix, CatalogMatrixArtifact};
pub use encoder::{FeatureEncoder, Field};
pub use tfidf::{FeatureModel, FeatureModelArtifact};

pub mod artifacts;
pub mod image_enricher;
pub mod recommendation;

// Re-export public types
pub use artifacts::ArtifactPaths;
pub use image_enricher::ImageEnricher;
pub use recommendation::RecommendationService;

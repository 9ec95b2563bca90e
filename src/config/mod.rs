use crate::error::Result;
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "APP";

/// Runtime settings, layered from defaults and `APP_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory holding the exported catalog and feature-model artifacts
    pub artifacts_dir: PathBuf,
    pub default_top_k: usize,
    pub max_top_k: usize,
    /// Image enrichment is disabled when no key is configured
    #[serde(default)]
    pub unsplash_api_key: Option<String>,
    pub unsplash_base_url: String,
    pub image_query_suffix: String,
    pub image_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 5000)?
            .set_default("artifacts_dir", "artifacts")?
            .set_default("default_top_k", 5)?
            .set_default("max_top_k", 100)?
            .set_default("unsplash_base_url", "https://api.unsplash.com")?
            .set_default("image_query_suffix", "indian food")?
            .set_default("image_timeout_secs", 5)?
            .add_source(source)
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_top_k == 0 || self.max_top_k == 0 {
            return Err(crate::error::ApiError::ConfigError(
                "default_top_k and max_top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether recommendations should be enriched with images
    pub fn image_enrichment_enabled(&self) -> bool {
        self.unsplash_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

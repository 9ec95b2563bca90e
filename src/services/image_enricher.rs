use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::Recommendation;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct RandomPhotoResponse {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    regular: String,
}

/// Attaches a photo URL to each recommendation using the Unsplash API.
///
/// Disabled when no API key is configured. Lookups that fail leave an empty
/// URL rather than failing the whole response.
#[derive(Debug, Clone)]
pub struct ImageEnricher {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    query_suffix: String,
}

impl ImageEnricher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.image_timeout_secs))
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = if config.image_enrichment_enabled() {
            config.unsplash_api_key.clone()
        } else {
            None
        };

        Ok(Self {
            client,
            api_key,
            base_url: config.unsplash_base_url.trim_end_matches('/').to_string(),
            query_suffix: config.image_query_suffix.clone(),
        })
    }

    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            api_key: None,
            base_url: String::new(),
            query_suffix: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Look up images for all recommendations concurrently.
    pub async fn enrich(&self, recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        if !self.is_enabled() {
            return recommendations;
        }

        let lookups = recommendations.iter().map(|r| self.fetch_image(&r.name));
        let urls = join_all(lookups).await;

        recommendations
            .into_iter()
            .zip(urls)
            .map(|(mut recommendation, url)| {
                recommendation.image_url = Some(url.unwrap_or_else(|e| {
                    warn!("Image fetch failed for '{}': {}", recommendation.name, e);
                    String::new()
                }));
                recommendation
            })
            .collect()
    }

    fn search_query(&self, recipe_name: &str) -> String {
        if self.query_suffix.is_empty() {
            recipe_name.to_string()
        } else {
            format!("{} {}", recipe_name, self.query_suffix)
        }
    }

    async fn fetch_image(&self, recipe_name: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::ExternalServiceError("Unsplash API key not set".into()))?;

        let url = format!("{}/photos/random", self.base_url);
        debug!("Fetching image for '{}'", recipe_name);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", self.search_query(recipe_name).as_str()),
                ("client_id", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::ExternalServiceError(format!(
                "Unsplash API error {}: {}",
                status, error_text
            )));
        }

        let photo: RandomPhotoResponse = response.json().await?;
        Ok(photo.urls.regular)
    }
}

use crate::{
    config::Config,
    error::Result,
    handlers::predict_config,
    routes::api_routes,
    services::{ArtifactPaths, ImageEnricher, RecommendationService},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{error, info};
use std::net::TcpListener;

/// Shared, read-only state handed to every worker
#[derive(Clone)]
pub struct AppState {
    pub recommendation_service: web::Data<RecommendationService>,
    pub image_enricher: web::Data<ImageEnricher>,
    pub config: web::Data<Config>,
}

impl AppState {
    pub fn new(
        recommendation_service: RecommendationService,
        image_enricher: ImageEnricher,
        config: Config,
    ) -> Self {
        Self {
            recommendation_service: web::Data::new(recommendation_service),
            image_enricher: web::Data::new(image_enricher),
            config: web::Data::new(config),
        }
    }

    /// Register app data and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.recommendation_service.clone())
            .app_data(self.image_enricher.clone())
            .app_data(self.config.clone())
            .service(api_routes());
        predict_config(cfg);
    }
}

pub struct Application {
    port: u16,
    host: String,
    state: AppState,
}

impl Application {
    /// Load the catalog artifacts and create a new application instance.
    ///
    /// Fails when any artifact is missing or inconsistent, so the server
    /// never starts without a usable catalog.
    pub fn new(config: &Config) -> Result<Self> {
        let paths = ArtifactPaths::in_dir(&config.artifacts_dir);
        info!("Loading artifacts from {}", config.artifacts_dir.display());

        let recommendation_service = RecommendationService::load(&paths).map_err(|e| {
            error!("Failed to load recommendation artifacts: {}", e);
            e
        })?;

        let image_enricher = ImageEnricher::new(config)?;
        if image_enricher.is_enabled() {
            info!("Image enrichment enabled");
        } else {
            info!("Image enrichment disabled: no Unsplash API key configured");
        }

        Ok(Self {
            port: config.port,
            host: config.host.clone(),
            state: AppState::new(recommendation_service, image_enricher, config.clone()),
        })
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)
            .with_context(|| format!("Failed to bind {}", bind_address))?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let state = self.state.clone();

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();
            let state = state.clone();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .configure(move |cfg| state.configure(cfg))
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}

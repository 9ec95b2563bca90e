use log::info;
use recipe_recommender_api::{app::Application, config::Config, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenv::dotenv().ok();

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default to info level if RUST_LOG is not set
                "recipe_recommender_api=info,actix_web=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Loading configuration...");
    let config = Config::load()?;

    // Artifacts are loaded before binding so a bad catalog never serves traffic
    let application = Application::new(&config)?;
    application.run().await
}

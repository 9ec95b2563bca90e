use actix_web::{web, Scope};

use crate::handlers::{catalog_stats, health_check, recommendations_config};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .service(catalog_stats)
        .configure(recommendations_config)
}

use crate::services::RecommendationService;
use actix_web::{get, web, HttpResponse};

/// Size of the loaded catalog and the width of each feature block
#[get("/catalog")]
pub async fn catalog_stats(
    recommendation_service: web::Data<RecommendationService>,
) -> HttpResponse {
    HttpResponse::Ok().json(recommendation_service.stats())
}

use crate::{
    config::Config,
    error::{ApiError, Result},
    models::{Recommendation, RecommendationRequest, RecommendationResponse},
    services::{ImageEnricher, RecommendationService},
};
use actix_web::{
    web::{self, Either, Form, Json},
    HttpResponse,
};
use tracing::{error, info};
use uuid::Uuid;

type RequestBody = Either<Json<RecommendationRequest>, Form<RecommendationRequest>>;

pub fn recommendations_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/recommendations").route(web::post().to(get_recommendations)));
}

/// Form endpoint kept at the path the recipe web page posts to
pub fn predict_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)));
}

/// Get recipe recommendations for an ingredient list and optional filters.
///
/// Accepts a JSON body or URL-encoded form. Every text field may be empty.
pub async fn get_recommendations(
    request: RequestBody,
    recommendation_service: web::Data<RecommendationService>,
    image_enricher: web::Data<ImageEnricher>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let recommendations =
        recommend(request, &recommendation_service, &image_enricher, &config).await?;
    Ok(HttpResponse::Ok().json(RecommendationResponse { recommendations }))
}

/// Same ranking as `get_recommendations`, answered with a bare JSON array.
pub async fn predict(
    request: RequestBody,
    recommendation_service: web::Data<RecommendationService>,
    image_enricher: web::Data<ImageEnricher>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let recommendations =
        recommend(request, &recommendation_service, &image_enricher, &config).await?;
    Ok(HttpResponse::Ok().json(recommendations))
}

async fn recommend(
    request: RequestBody,
    recommendation_service: &RecommendationService,
    image_enricher: &ImageEnricher,
    config: &Config,
) -> Result<Vec<Recommendation>> {
    let request = match request {
        Either::Left(Json(request)) => request,
        Either::Right(Form(request)) => request,
    };
    let request_id = Uuid::new_v4();

    let top_k = resolve_top_k(request.top_k, config)?;
    info!(
        %request_id,
        "Received recommendation request: ingredients='{}', diet='{}', course='{}', region='{}', top_k={}",
        request.ingredients, request.diet, request.course, request.region, top_k
    );

    let recommendations = recommendation_service
        .rank(&request.query(), top_k)
        .map_err(|e| {
            error!(%request_id, "Ranking failed: {}", e);
            e
        })?;

    let recommendations = image_enricher.enrich(recommendations).await;
    info!(
        %request_id,
        "Returning {} recommendations. First recipe: {:?}",
        recommendations.len(),
        recommendations.first().map(|r| &r.name)
    );

    Ok(recommendations)
}

fn resolve_top_k(requested: Option<usize>, config: &Config) -> Result<usize> {
    match requested {
        Some(0) => Err(ApiError::InvalidInput(
            "top_k must be at least 1".to_string(),
        )),
        Some(top_k) => Ok(top_k.min(config.max_top_k)),
        None => Ok(config.default_top_k.min(config.max_top_k)),
    }
}

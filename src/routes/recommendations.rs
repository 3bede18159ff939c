use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::core::recommender::{DisplayedStore, RecommendError, Recommender};
use crate::models::{
    ErrorResponse, HealthResponse, NextRecommendationRequest, ShownQuery, ShownResponse,
};
use crate::services::{PostgresProfileStore, RedisDisplayedStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub profiles: Arc<PostgresProfileStore>,
    pub displayed: Arc<RedisDisplayedStore>,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/recommendations/next", web::post().to(next_recommendation))
        .route("/recommendations/shown", web::get().to(shown_profiles));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.profiles.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Next recommendation endpoint
///
/// POST /api/v1/recommendations/next
///
/// Request body:
/// ```json
/// {
///   "userId": "string"
/// }
/// ```
///
/// Returns the single best unseen candidate for the viewer, or 404 when
/// the filters exhaust the pool.
async fn next_recommendation(
    state: web::Data<AppState>,
    req: web::Json<NextRecommendationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let viewer_id = match Uuid::parse_str(&req.user_id) {
        Ok(id) => id,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid user id".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    tracing::info!("Finding next recommendation for user: {}", viewer_id);

    match state.recommender.recommend(viewer_id).await {
        Ok(recommendation) => HttpResponse::Ok().json(recommendation),
        Err(RecommendError::NoNewRecommendations) => HttpResponse::NotFound().json(ErrorResponse {
            error: "no_new_recommendations".to_string(),
            message: "no new recommendations available".to_string(),
            status_code: 404,
        }),
        Err(RecommendError::Store(e)) => {
            tracing::error!("Recommendation failed for {}: {}", viewer_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch recommendation".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Shown profiles for a viewer
///
/// GET /api/v1/recommendations/shown?userId={userId}
///
/// Returns the ids already presented to the viewer, for client-side
/// synchronization and debugging purposes.
async fn shown_profiles(
    state: web::Data<AppState>,
    query: web::Query<ShownQuery>,
) -> impl Responder {
    let viewer_id = match Uuid::parse_str(&query.user_id) {
        Ok(id) => id,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid user id".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    match state.displayed.shown(viewer_id).await {
        Ok(shown) => {
            let mut shown_profiles: Vec<Uuid> = shown.into_iter().collect();
            shown_profiles.sort();

            HttpResponse::Ok().json(ShownResponse {
                user_id: viewer_id,
                count: shown_profiles.len(),
                shown_profiles,
            })
        }
        Err(e) => {
            tracing::error!("Failed to fetch shown profiles for {}: {}", viewer_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch shown profiles".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

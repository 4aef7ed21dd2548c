use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::Matcher;
use crate::models::{ErrorResponse, FindMatchesRequest, HealthResponse};
use crate::services::ListingStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
    pub matcher: Matcher,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match", web::post().to(find_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        reasoning_enabled: state.matcher.ai_powered(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/match
///
/// Request body:
/// ```json
/// {
///   "answers": {
///     "city": "Bristol",
///     "budget": "£200K-£400K",
///     "family_size": "Small family",
///     "pets": "Dog",
///     "vibe": ["Quiet", "Leafy"]
///   }
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!("Matching buyer with {} answers", req.answers.len());

    match state.matcher.find_matches(&req.answers).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            tracing::error!("Matching failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "matching_failed".to_string(),
                message: "Matching failed. Please try again.".to_string(),
                status_code: 500,
            })
        }
    }
}

//! Health check endpoint.

use actix_web::{HttpResponse, web};

use blogicum_shared::dto::HealthResponse;

use crate::state::AppState;

/// Liveness check.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: state.clock.now(),
    })
}

use actix_web::{HttpResponse, Responder, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::api::board::BoardService;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    snapshot: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refreshed_at: Option<DateTime<Utc>>,
}

fn snapshot_state(service: &BoardService) -> (bool, HealthResponse) {
    let store = service.store();
    let loaded = store.is_loaded();
    let response = HealthResponse {
        status: String::new(),
        snapshot: if loaded { "loaded" } else { "pending" }.to_string(),
        revision: loaded.then(|| store.current().revision),
        refreshed_at: store.last_refreshed_at(),
    };
    (loaded, response)
}

/// Health check endpoint
///
/// Always 200 while the process serves requests; reports snapshot state.
/// A stale snapshot is still healthy: the board keeps serving it.
#[get("/health")]
async fn health_check(service: web::Data<BoardService>) -> impl Responder {
    let (_, mut response) = snapshot_state(&service);
    response.status = "healthy".to_string();
    HttpResponse::Ok().json(response)
}

/// Readiness check endpoint
///
/// Ready once the first snapshot has been loaded.
#[get("/ready")]
async fn readiness_check(service: web::Data<BoardService>) -> impl Responder {
    let (loaded, mut response) = snapshot_state(&service);
    if loaded {
        response.status = "ready".to_string();
        HttpResponse::Ok().json(response)
    } else {
        warn!("Readiness check failed: job snapshot not loaded yet");
        response.status = "not_ready".to_string();
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Liveness check endpoint
///
/// Simple check that the process is alive. Does not check dependencies.
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "alive"}))
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}

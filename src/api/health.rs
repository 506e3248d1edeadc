use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::LocalDatabase;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub storage: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Data directory is not reachable", body = HealthResponse)
    )
)]
pub async fn health_check(db: web::Data<LocalDatabase>) -> HttpResponse {
    let storage_ok = tokio::fs::metadata(db.students_dir())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let body = HealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        service: "college-admin-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: db.root().display().to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };

    if storage_ok {
        HttpResponse::Ok().json(body)
    } else {
        log::error!("❌ Health check failed: {} is not readable", db.students_dir().display());
        HttpResponse::ServiceUnavailable().json(body)
    }
}

//! Health check

use axum::{routing::get, Json, Router};

use crate::models::HealthCheck;
use crate::AppState;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = HealthCheck)),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Tally API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, json, send};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);

        let health: serde_json::Value = json(&body);
        assert_eq!(health["status"], "ok");
    }
}

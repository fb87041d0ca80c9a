//! Tally API Routes
//!
//! - /health - Liveness and version
//! - /api/customers - Customer management
//! - /api/invoices - Invoices, date constraints and exports
//! - /swagger-ui - OpenAPI documentation

pub mod customers;
pub mod health;
pub mod invoices;
pub mod swagger;

use axum::{http::HeaderValue, http::StatusCode, Router};
use tally::DomainError;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::AppState;

/// Handler error: status plus plain-text message
pub type ApiError = (StatusCode, String);

/// Map domain errors onto HTTP status codes
pub fn domain_error(e: DomainError) -> ApiError {
    let status = match &e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub fn validation_error(e: validator::ValidationErrors) -> ApiError {
    (StatusCode::BAD_REQUEST, format!("Validation error: {}", e))
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️  Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let openapi = swagger::ApiDoc::openapi();
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .merge(health::router())
        .merge(customers::router())
        .merge(invoices::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_mapping() {
        let id = uuid::Uuid::nil();
        assert_eq!(domain_error(DomainError::not_found("Invoice", id)).0, StatusCode::NOT_FOUND);
        assert_eq!(domain_error(DomainError::validation("bad")).0, StatusCode::BAD_REQUEST);
        assert_eq!(domain_error(DomainError::conflict("dup")).0, StatusCode::CONFLICT);
        assert_eq!(
            domain_error(DomainError::Repository("down".to_string())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = test_support::app();
        let (status, body) = test_support::send(&app, "GET", "/api-docs/openapi.json", None).await;

        assert_eq!(status, StatusCode::OK);
        let doc: serde_json::Value = test_support::json(&body);
        assert!(doc["paths"]["/api/invoices/date-constraints/{invoice_number}"].is_object());
    }
}

use sqlx::PgPool;
use std::sync::Arc;

mod adapters;
mod application;
mod config;
mod models;
mod routes;

use adapters::{PgCustomerRepository, PgInvoiceRepository};
use application::{CustomerService, InvoiceService};
use config::Config;
use tally::{CustomerRepository, InvoiceRepository};

/// Application services over type-erased repositories
pub type AppCustomerService = CustomerService<dyn CustomerRepository>;
pub type AppInvoiceService = InvoiceService<dyn InvoiceRepository>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub customer_service: Arc<AppCustomerService>,
    pub invoice_service: Arc<AppInvoiceService>,
    pub config: Arc<Config>,
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("🧾 Tally API initializing...");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| shuttle_runtime::Error::Database(e.to_string()))?;

    tracing::info!("✅ Database migrations completed");

    let config = Config::from_secrets(&secrets);
    if config.cors_allowed_origins.is_empty() {
        tracing::warn!("⚠️  No CORS_ALLOWED_ORIGINS set - CORS is permissive");
    }
    tracing::info!(
        "📐 Invoice neighbour policy: {} (page size {} / max {})",
        config.neighbor_policy,
        config.default_page_size,
        config.max_page_size
    );

    // Initialize application services
    let customer_repo: Arc<dyn CustomerRepository> =
        Arc::new(PgCustomerRepository::new(pool.clone()));
    let invoice_repo: Arc<dyn InvoiceRepository> = Arc::new(PgInvoiceRepository::new(pool));

    let state = AppState {
        customer_service: Arc::new(CustomerService::new(customer_repo)),
        invoice_service: Arc::new(InvoiceService::new(invoice_repo, config.neighbor_policy)),
        config: Arc::new(config),
    };

    let router = routes::app(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Tally API ready");

    Ok(router.into())
}

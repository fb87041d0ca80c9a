//! PostgreSQL Repository Implementations

mod customer_repository;
mod invoice_repository;

pub use customer_repository::PgCustomerRepository;
pub use invoice_repository::PgInvoiceRepository;

use tally::DomainError;

/// Map sqlx failures onto domain errors; unique-key violations become conflicts
fn map_sqlx_error(e: sqlx::Error) -> DomainError {
    if let Some(db_error) = e.as_database_error() {
        if db_error.is_unique_violation() {
            return DomainError::Conflict(db_error.message().to_string());
        }
    }
    tracing::error!("Database error: {}", e);
    DomainError::Repository(e.to_string())
}

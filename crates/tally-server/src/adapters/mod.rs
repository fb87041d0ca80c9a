//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems, plus the report
//! renderers used by invoice exports.

pub mod export;
pub mod postgres;

// Re-exports
pub use export::ExportFormat;
pub use postgres::{PgCustomerRepository, PgInvoiceRepository};

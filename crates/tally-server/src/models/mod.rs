//! Tally Data Models
//!
//! Request/response DTOs for the HTTP API:
//! - Customer: parties invoices are issued to
//! - Invoice: invoices, items, listings and date constraints

mod customer;
mod invoice;

pub use customer::*;
pub use invoice::*;

use serde::Serialize;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
    pub version: String,
}

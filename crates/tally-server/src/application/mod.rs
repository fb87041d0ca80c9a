//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations over the repository ports.

mod customer_service;
mod invoice_service;

pub use customer_service::CustomerService;
pub use invoice_service::InvoiceService;

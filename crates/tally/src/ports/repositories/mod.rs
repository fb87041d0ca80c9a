//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod customer_repository;
mod invoice_repository;

pub use customer_repository::*;
pub use invoice_repository::*;

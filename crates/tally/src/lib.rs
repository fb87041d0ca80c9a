//! Tally Domain Library
//!
//! Core domain types and interfaces for the Tally bookkeeping system.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Customer, Invoice, InvoiceItem)
//!   - `value_objects/`: Immutable value types (InvoiceNumber, NeighborPolicy)
//!   - `services/`: Invoice arithmetic, date constraints, export ordering
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!
//! - **Memory** (`memory`): In-memory port implementations
//!
//! # Usage
//!
//! ```rust,ignore
//! use tally::domain::{Invoice, InvoiceNumber};
//! use tally::ports::InvoiceRepository;
//! ```

pub mod domain;
pub mod memory;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    compute_amounts, compute_unit_price, resolve_date_constraints, sort_for_export,
    validate_amount, Customer, CustomerChanges, DateConstraints, DomainError, Invoice,
    InvoiceAmounts, InvoiceChanges, InvoiceItem, InvoiceNumber, InvoiceRef, NeighborPolicy,
    NewInvoice, NewInvoiceItem, AMOUNT_DP, MAX_AMOUNT,
};
pub use ports::{
    // Repositories
    CustomerRepository,
    DateRange,
    ExportFilter,
    InvoiceQuery,
    InvoiceRepository,
    Page,
};

//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Customer: Party invoices are issued to
//! - Invoice: Numbered, dated invoice owning its line items

mod customer;
mod invoice;

pub use customer::*;
pub use invoice::*;

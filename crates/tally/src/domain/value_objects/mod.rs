//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod invoice_number;
mod neighbor_policy;

pub use invoice_number::*;
pub use neighbor_policy::*;

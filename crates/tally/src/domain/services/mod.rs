//! Domain Services
//!
//! Stateless business rules that span entities.

pub mod amounts;
pub mod date_constraints;
pub mod export_order;

pub use amounts::{
    compute_amounts, compute_unit_price, validate_amount, InvoiceAmounts, AMOUNT_DP, MAX_AMOUNT,
    TAX_RATE,
};
pub use date_constraints::{resolve_date_constraints, DateConstraints};
pub use export_order::sort_for_export;

//! Invoice - Numbered, dated sales invoice and its line items
//!
//! Pure domain entity without infrastructure dependencies. Totals are never
//! set directly: they are derived from the items every time the invoice is
//! built or changed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::services::amounts::{
    compute_amounts, compute_unit_price, validate_amount, InvoiceAmounts, MAX_AMOUNT,
};
use crate::domain::value_objects::InvoiceNumber;

/// Line item owned by an invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub amount: Decimal,
    pub unit_price: Decimal,
}

impl InvoiceItem {
    /// Create an item, deriving its unit price from amount and quantity
    pub fn new(product_name: String, quantity: i32, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_name,
            quantity,
            amount,
            unit_price: compute_unit_price(amount, quantity),
        }
    }
}

/// Item as submitted by a caller, before a unit price exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoiceItem {
    pub product_name: String,
    pub quantity: i32,
    pub amount: Decimal,
}

impl From<NewInvoiceItem> for InvoiceItem {
    fn from(item: NewInvoiceItem) -> Self {
        InvoiceItem::new(item.product_name, item.quantity, item.amount)
    }
}

/// Everything needed to issue a new invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_date: NaiveDate,
    pub invoice_number: InvoiceNumber,
    pub is_voided: bool,
    pub is_blank: bool,
    pub is_dual_format: bool,
    pub customer_code: Option<String>,
    pub buyer: String,
    pub items: Vec<NewInvoiceItem>,
}

/// Partial update of an invoice; `items`, when present, replaces all items
#[derive(Debug, Clone, Default)]
pub struct InvoiceChanges {
    pub invoice_date: Option<NaiveDate>,
    pub invoice_number: Option<InvoiceNumber>,
    pub is_voided: Option<bool>,
    pub is_blank: Option<bool>,
    pub is_dual_format: Option<bool>,
    pub customer_code: Option<String>,
    pub buyer: Option<String>,
    pub items: Option<Vec<NewInvoiceItem>>,
}

/// Invoice with derived totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub is_voided: bool,
    pub is_blank: bool,
    pub is_dual_format: bool,
    pub customer_code: Option<String>,
    pub buyer: String,
    pub items: Vec<InvoiceItem>,
    pub tax_excluded_amount: Decimal,
    pub tax: Decimal,
    pub tax_included_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity and date of an invoice, enough to bound a neighbour's date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceRef {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
}

impl Invoice {
    /// Issue a new invoice with generated ID, timestamps and computed totals
    pub fn new(draft: NewInvoice) -> Result<Self, DomainError> {
        let now = Utc::now();
        let mut invoice = Self {
            id: Uuid::new_v4(),
            invoice_number: draft.invoice_number.into(),
            invoice_date: draft.invoice_date,
            is_voided: draft.is_voided,
            is_blank: draft.is_blank,
            is_dual_format: draft.is_dual_format,
            customer_code: normalize_code(draft.customer_code),
            buyer: draft.buyer,
            items: draft.items.into_iter().map(Into::into).collect(),
            tax_excluded_amount: Decimal::ZERO,
            tax: Decimal::ZERO,
            tax_included_amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        invoice.recalculate();
        invoice.validate()?;

        Ok(invoice)
    }

    /// Apply a partial update and recompute totals
    pub fn apply(self, changes: InvoiceChanges) -> Result<Self, DomainError> {
        let mut updated = Self {
            invoice_number: changes
                .invoice_number
                .map(Into::into)
                .unwrap_or(self.invoice_number),
            invoice_date: changes.invoice_date.unwrap_or(self.invoice_date),
            is_voided: changes.is_voided.unwrap_or(self.is_voided),
            is_blank: changes.is_blank.unwrap_or(self.is_blank),
            is_dual_format: changes.is_dual_format.unwrap_or(self.is_dual_format),
            customer_code: match changes.customer_code {
                Some(code) => normalize_code(Some(code)),
                None => self.customer_code,
            },
            buyer: changes.buyer.unwrap_or(self.buyer),
            items: match changes.items {
                Some(items) => items.into_iter().map(Into::into).collect(),
                None => self.items,
            },
            updated_at: Utc::now(),
            ..self
        };
        updated.recalculate();
        updated.validate()?;

        Ok(updated)
    }

    /// Content and storage limits that hold after totals are derived
    fn validate(&self) -> Result<(), DomainError> {
        if !self.is_without_content() && self.items.is_empty() {
            return Err(DomainError::validation(
                "An invoice that is neither voided nor blank needs at least one item",
            ));
        }

        for item in &self.items {
            validate_amount(item.amount)?;
        }

        if self.tax_included_amount > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "Invoice total {} exceeds the maximum of {}",
                self.tax_included_amount, MAX_AMOUNT
            )));
        }

        Ok(())
    }

    /// Voided and blank invoices carry no goods and no money
    pub fn is_without_content(&self) -> bool {
        self.is_voided || self.is_blank
    }

    /// Re-derive totals from items, enforcing the voided/blank invariant
    pub fn recalculate(&mut self) {
        if self.is_without_content() {
            self.items.clear();
            self.customer_code = None;
            self.buyer.clear();
            self.set_amounts(InvoiceAmounts::zero());
            return;
        }

        let amounts = compute_amounts(
            self.items.iter().map(|item| item.amount),
            self.is_dual_format,
        );
        self.set_amounts(amounts);
    }

    fn set_amounts(&mut self, amounts: InvoiceAmounts) {
        self.tax_excluded_amount = amounts.tax_excluded_amount;
        self.tax = amounts.tax;
        self.tax_included_amount = amounts.tax_included_amount;
    }

    /// Totals as a single value
    pub fn amounts(&self) -> InvoiceAmounts {
        InvoiceAmounts {
            tax_excluded_amount: self.tax_excluded_amount,
            tax: self.tax,
            tax_included_amount: self.tax_included_amount,
        }
    }

    /// Parsed invoice number
    pub fn number(&self) -> Result<InvoiceNumber, DomainError> {
        self.invoice_number.parse()
    }

    /// Two-letter track of the invoice number
    pub fn prefix(&self) -> &str {
        self.invoice_number.get(..2).unwrap_or(&self.invoice_number)
    }

    pub fn to_ref(&self) -> InvoiceRef {
        InvoiceRef {
            id: self.id,
            invoice_number: self.invoice_number.clone(),
            invoice_date: self.invoice_date,
        }
    }
}

fn normalize_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

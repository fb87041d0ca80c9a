//! Invoice DTOs
//!
//! Amounts travel as JSON numbers. Totals and unit prices in responses are
//! always server-computed; requests never carry them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use tally::{
    DateConstraints, DateRange, ExportFilter, Invoice, InvoiceChanges, InvoiceItem,
    InvoiceNumber, InvoiceRef, NewInvoice, NewInvoiceItem, AMOUNT_DP, MAX_AMOUNT,
};

fn validate_invoice_number(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<InvoiceNumber>()
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("invoice_number").with_message(
                "Invoice number must be two uppercase letters and eight digits".into(),
            )
        })
}

fn validate_item_amount(value: &Decimal) -> Result<(), ValidationError> {
    tally::validate_amount(*value).map_err(|_| {
        ValidationError::new("amount").with_message(
            format!(
                "Amount must be between 0 and {} with at most {} decimal places",
                MAX_AMOUNT, AMOUNT_DP
            )
            .into(),
        )
    })
}

/// Line item in a create/update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvoiceItemRequest {
    #[validate(length(min = 1, max = 200, message = "Product name must be 1-200 characters"))]
    pub product_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom(function = "validate_item_amount"))]
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

impl From<InvoiceItemRequest> for NewInvoiceItem {
    fn from(req: InvoiceItemRequest) -> Self {
        Self {
            product_name: req.product_name,
            quantity: req.quantity,
            amount: req.amount,
        }
    }
}

/// Create Invoice request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceRequest {
    pub invoice_date: NaiveDate,
    #[validate(custom(function = "validate_invoice_number"))]
    pub invoice_number: String,
    #[serde(default)]
    pub is_voided: bool,
    #[serde(default)]
    pub is_blank: bool,
    #[serde(default)]
    pub is_dual_format: bool,
    #[validate(length(max = 20, message = "Customer code must be at most 20 characters"))]
    pub customer_code: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "Buyer must be at most 100 characters"))]
    pub buyer: String,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<InvoiceItemRequest>,
}

impl TryFrom<CreateInvoiceRequest> for NewInvoice {
    type Error = tally::DomainError;

    fn try_from(req: CreateInvoiceRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            invoice_date: req.invoice_date,
            invoice_number: req.invoice_number.parse()?,
            is_voided: req.is_voided,
            is_blank: req.is_blank,
            is_dual_format: req.is_dual_format,
            customer_code: req.customer_code,
            buyer: req.buyer,
            items: req.items.into_iter().map(Into::into).collect(),
        })
    }
}

/// Update Invoice request; `items`, when present, replaces all items
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceRequest {
    pub invoice_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_invoice_number"))]
    pub invoice_number: Option<String>,
    pub is_voided: Option<bool>,
    pub is_blank: Option<bool>,
    pub is_dual_format: Option<bool>,
    #[validate(length(max = 20, message = "Customer code must be at most 20 characters"))]
    pub customer_code: Option<String>,
    #[validate(length(max = 100, message = "Buyer must be at most 100 characters"))]
    pub buyer: Option<String>,
    #[validate(nested)]
    pub items: Option<Vec<InvoiceItemRequest>>,
}

impl TryFrom<UpdateInvoiceRequest> for InvoiceChanges {
    type Error = tally::DomainError;

    fn try_from(req: UpdateInvoiceRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            invoice_date: req.invoice_date,
            invoice_number: req.invoice_number.map(|n| n.parse()).transpose()?,
            is_voided: req.is_voided,
            is_blank: req.is_blank,
            is_dual_format: req.is_dual_format,
            customer_code: req.customer_code,
            buyer: req.buyer,
            items: req
                .items
                .map(|items| items.into_iter().map(Into::into).collect()),
        })
    }
}

/// Line item response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
}

impl From<InvoiceItem> for InvoiceItemResponse {
    fn from(item: InvoiceItem) -> Self {
        Self {
            id: item.id,
            product_name: item.product_name,
            quantity: item.quantity,
            amount: item.amount,
            unit_price: item.unit_price,
        }
    }
}

/// Invoice response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub is_voided: bool,
    pub is_blank: bool,
    pub is_dual_format: bool,
    pub customer_code: Option<String>,
    pub buyer: String,
    pub items: Vec<InvoiceItemResponse>,
    #[schema(value_type = f64)]
    pub tax_excluded_amount: Decimal,
    #[schema(value_type = f64)]
    pub tax: Decimal,
    #[schema(value_type = f64)]
    pub tax_included_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            invoice_date: invoice.invoice_date,
            is_voided: invoice.is_voided,
            is_blank: invoice.is_blank,
            is_dual_format: invoice.is_dual_format,
            customer_code: invoice.customer_code,
            buyer: invoice.buyer,
            items: invoice.items.into_iter().map(Into::into).collect(),
            tax_excluded_amount: invoice.tax_excluded_amount,
            tax: invoice.tax,
            tax_included_amount: invoice.tax_included_amount,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// One page of invoices
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceListResponse {
    pub data: Vec<InvoiceResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// Listing parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct InvoiceListQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size (server default and maximum apply)
    pub limit: Option<u32>,
    /// Substring of invoice number, buyer or customer code
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Export selection parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ExportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl From<ExportQuery> for ExportFilter {
    fn from(query: ExportQuery) -> Self {
        Self {
            search: query.search,
            dates: DateRange {
                start: query.start_date,
                end: query.end_date,
            },
        }
    }
}

/// Date-constraint lookup parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DateConstraintsQuery {
    /// Invoice being edited; never counted as its own neighbour
    pub exclude_id: Option<Uuid>,
}

/// Neighbouring invoice
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceRefResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
}

impl From<InvoiceRef> for InvoiceRefResponse {
    fn from(r: InvoiceRef) -> Self {
        Self {
            id: r.id,
            invoice_number: r.invoice_number,
            invoice_date: r.invoice_date,
        }
    }
}

/// Allowed date range for an invoice number
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DateConstraintsResponse {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub prev_invoice: Option<InvoiceRefResponse>,
    pub next_invoice: Option<InvoiceRefResponse>,
}

impl From<DateConstraints> for DateConstraintsResponse {
    fn from(c: DateConstraints) -> Self {
        Self {
            min_date: c.min_date,
            max_date: c.max_date,
            prev_invoice: c.prev_invoice.map(Into::into),
            next_invoice: c.next_invoice.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, amount: i64) -> InvoiceItemRequest {
        InvoiceItemRequest {
            product_name: "Widget".to_string(),
            quantity,
            amount: Decimal::from(amount),
        }
    }

    fn request() -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            invoice_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            invoice_number: "AB00000005".to_string(),
            is_voided: false,
            is_blank: false,
            is_dual_format: false,
            customer_code: None,
            buyer: "Acme".to_string(),
            items: vec![item(1, 100)],
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_malformed_invoice_number_rejected() {
        let mut req = request();
        req.invoice_number = "ab00000005".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_item_quantity_and_amount_checked() {
        let mut req = request();
        req.items = vec![item(0, 100)];
        assert!(req.validate().is_err());

        req.items = vec![item(1, -1)];
        assert!(req.validate().is_err());

        req.items = vec![item(1, 0)];
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_item_amount_must_fit_storage() {
        let mut req = request();

        req.items[0].amount = MAX_AMOUNT;
        assert!(req.validate().is_ok());

        req.items[0].amount = Decimal::from(10_000_000_000i64);
        assert!(req.validate().is_err());

        req.items[0].amount = "10.125".parse().unwrap();
        assert!(req.validate().is_err());

        req.items[0].amount = "10.13".parse().unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_validates_optional_number() {
        let req = UpdateInvoiceRequest {
            invoice_number: Some("AB123".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let changes = InvoiceChanges::try_from(UpdateInvoiceRequest {
            invoice_number: Some("AB00000006".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.invoice_number.unwrap().as_str(), "AB00000006");
    }

    #[test]
    fn test_request_deserializes_numeric_amounts() {
        let req: CreateInvoiceRequest = serde_json::from_str(
            r#"{
                "invoice_date": "2024-01-10",
                "invoice_number": "AB00000005",
                "buyer": "Acme",
                "items": [{"product_name": "Widget", "quantity": 3, "amount": 12.5}]
            }"#,
        )
        .unwrap();

        assert!(!req.is_voided);
        assert_eq!(req.items[0].amount, Decimal::new(125, 1));
    }
}

//! Invoice export renderers
//!
//! Each renderer takes invoices already in report order and returns the
//! file body. Formats: CSV, PDF and Excel (xlsx).

mod csv;
mod excel;
mod pdf;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally::Invoice;
use thiserror::Error;
use utoipa::ToSchema;

/// Column headers shared by the tabular exports
pub(crate) const HEADERS: [&str; 11] = [
    "發票日期",
    "發票號碼",
    "客戶代號",
    "買受人",
    "品名",
    "數量",
    "單價",
    "金額",
    "未稅金額",
    "稅金",
    "含稅金額",
];

/// Export rendering errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
    Excel,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
        }
    }

    /// Download name, e.g. `invoices_2024-05-01.xlsx`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("invoices_{}.{}", date.format("%Y-%m-%d"), self.extension())
    }

    pub fn render(&self, invoices: &[Invoice]) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Csv => csv::render(invoices),
            ExportFormat::Pdf => pdf::render(invoices),
            ExportFormat::Excel => excel::render(invoices),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Excel => write!(f, "excel"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            other => Err(format!(
                "Unknown export format: {} (expected csv, pdf or excel)",
                other
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tally::{Invoice, NewInvoice, NewInvoiceItem};

    pub fn invoice(number: &str, day: u32, items: &[(&str, i32, i64)]) -> Invoice {
        Invoice::new(NewInvoice {
            invoice_date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            invoice_number: number.parse().unwrap(),
            is_voided: items.is_empty(),
            is_blank: false,
            is_dual_format: false,
            customer_code: Some("C001".to_string()),
            buyer: "Acme Trading".to_string(),
            items: items
                .iter()
                .map(|(name, quantity, amount)| NewInvoiceItem {
                    product_name: name.to_string(),
                    quantity: *quantity,
                    amount: Decimal::from(*amount),
                })
                .collect(),
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing_accepts_xlsx_alias() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_file_name_uses_extension() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(ExportFormat::Excel.file_name(date), "invoices_2024-05-01.xlsx");
        assert_eq!(ExportFormat::Pdf.file_name(date), "invoices_2024-05-01.pdf");
    }
}

//! Invoice Repository Port
//!
//! Abstract interface for Invoice persistence operations. Items are owned by
//! their invoice: they are loaded, replaced and deleted together with it.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, Invoice, InvoiceNumber, InvoiceRef};

/// Inclusive date range, open on either side when a bound is `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Paged, filtered listing of invoices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    /// Case-insensitive substring of invoice number, buyer or customer code
    pub search: Option<String>,
    pub dates: DateRange,
}

impl Default for InvoiceQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            dates: DateRange::default(),
        }
    }
}

impl InvoiceQuery {
    /// Number of rows skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }
}

/// Selection of invoices for an export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub search: Option<String>,
    pub dates: DateRange,
}

/// One page of results plus the total number of matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
}

/// Case-insensitive substring match used by invoice searches
pub fn matches_search(invoice: &Invoice, search: Option<&str>) -> bool {
    let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();

    [
        Some(invoice.invoice_number.as_str()),
        Some(invoice.buyer.as_str()),
        invoice.customer_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Repository interface for Invoice entities
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Find an Invoice (with items) by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError>;

    /// Find the invoice carrying exactly `number`, skipping `exclude_id`
    async fn find_by_number(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError>;

    /// Greatest number strictly below `number` in the same track
    async fn find_nearest_before(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError>;

    /// Smallest number strictly above `number` in the same track
    async fn find_nearest_after(
        &self,
        number: &InvoiceNumber,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<InvoiceRef>, DomainError>;

    /// Paged search, newest first
    async fn search(&self, query: &InvoiceQuery) -> Result<Page<Invoice>, DomainError>;

    /// All invoices matching an export filter, unordered
    async fn find_for_export(&self, filter: &ExportFilter) -> Result<Vec<Invoice>, DomainError>;

    /// Save an Invoice (insert or update), replacing its items
    async fn save(&self, invoice: &Invoice) -> Result<Invoice, DomainError>;

    /// Delete an Invoice and its items
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let range = DateRange {
            start: Some(date(1, 1)),
            end: Some(date(1, 31)),
        };
        assert!(range.contains(date(1, 1)));
        assert!(range.contains(date(1, 31)));
        assert!(!range.contains(date(2, 1)));
    }

    #[test]
    fn test_open_date_range() {
        let from = DateRange {
            start: Some(date(6, 1)),
            end: None,
        };
        assert!(from.contains(date(12, 31)));
        assert!(!from.contains(date(5, 31)));
        assert!(DateRange::default().contains(date(1, 1)));
    }

    #[test]
    fn test_offset_is_one_based() {
        let query = InvoiceQuery {
            page: 3,
            limit: 20,
            ..Default::default()
        };
        assert_eq!(query.offset(), 40);
        assert_eq!(InvoiceQuery { page: 0, ..Default::default() }.offset(), 0);
    }
}

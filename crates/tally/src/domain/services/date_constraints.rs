//! Invoice date constraints
//!
//! Invoices in one track are dated in the same order they are numbered, so
//! the neighbours of a number bound the dates it may carry. This module only
//! reports the bound; callers decide whether to enforce it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::InvoiceRef;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{InvoiceNumber, NeighborPolicy};
use crate::ports::InvoiceRepository;

/// Inclusive date range allowed for an invoice number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateConstraints {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub prev_invoice: Option<InvoiceRef>,
    pub next_invoice: Option<InvoiceRef>,
}

impl DateConstraints {
    pub fn from_neighbors(prev: Option<InvoiceRef>, next: Option<InvoiceRef>) -> Self {
        Self {
            min_date: prev.as_ref().map(|p| p.invoice_date),
            max_date: next.as_ref().map(|n| n.invoice_date),
            prev_invoice: prev,
            next_invoice: next,
        }
    }
}

/// Find the neighbours of `number` within its track and derive the date bound.
///
/// `exclude_id` skips the invoice being edited so it never bounds itself.
pub async fn resolve_date_constraints<R>(
    repo: &R,
    number: &InvoiceNumber,
    exclude_id: Option<Uuid>,
    policy: NeighborPolicy,
) -> Result<DateConstraints, DomainError>
where
    R: InvoiceRepository + ?Sized,
{
    let (prev, next) = match policy {
        NeighborPolicy::Adjacent => {
            let prev = match number.predecessor() {
                Some(candidate) => repo.find_by_number(&candidate, exclude_id).await?,
                None => None,
            };
            let next = match number.successor() {
                Some(candidate) => repo.find_by_number(&candidate, exclude_id).await?,
                None => None,
            };
            (prev, next)
        }
        NeighborPolicy::Nearest => (
            repo.find_nearest_before(number, exclude_id).await?,
            repo.find_nearest_after(number, exclude_id).await?,
        ),
    };

    tracing::debug!(
        invoice_number = %number,
        %policy,
        prev = prev.as_ref().map(|p| p.invoice_number.as_str()),
        next = next.as_ref().map(|n| n.invoice_number.as_str()),
        "Resolved invoice neighbours"
    );

    Ok(DateConstraints::from_neighbors(prev, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Invoice, NewInvoice, NewInvoiceItem};
    use crate::memory::InMemoryInvoiceRepository;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(number: &str, invoice_date: NaiveDate) -> Invoice {
        Invoice::new(NewInvoice {
            invoice_date,
            invoice_number: number.parse().unwrap(),
            is_voided: false,
            is_blank: false,
            is_dual_format: false,
            customer_code: None,
            buyer: "Buyer".to_string(),
            items: vec![NewInvoiceItem {
                product_name: "Item".to_string(),
                quantity: 1,
                amount: Decimal::from(100),
            }],
        })
        .unwrap()
    }

    async fn repo_with(invoices: Vec<Invoice>) -> InMemoryInvoiceRepository {
        let repo = InMemoryInvoiceRepository::new();
        for inv in invoices {
            repo.save(&inv).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_both_neighbours_bound_the_range() {
        let repo = repo_with(vec![
            invoice("AB00000004", date(2024, 1, 10)),
            invoice("AB00000006", date(2024, 1, 12)),
        ])
        .await;
        let number: InvoiceNumber = "AB00000005".parse().unwrap();

        for policy in [NeighborPolicy::Adjacent, NeighborPolicy::Nearest] {
            let c = resolve_date_constraints(&repo, &number, None, policy)
                .await
                .unwrap();
            assert_eq!(c.min_date, Some(date(2024, 1, 10)), "{}", policy);
            assert_eq!(c.max_date, Some(date(2024, 1, 12)), "{}", policy);
            assert_eq!(c.prev_invoice.unwrap().invoice_number, "AB00000004");
            assert_eq!(c.next_invoice.unwrap().invoice_number, "AB00000006");
        }
    }

    #[tokio::test]
    async fn test_missing_predecessor_is_absent() {
        let repo = repo_with(vec![invoice("AB00000002", date(2024, 2, 1))]).await;
        let number: InvoiceNumber = "AB00000001".parse().unwrap();

        for policy in [NeighborPolicy::Adjacent, NeighborPolicy::Nearest] {
            let c = resolve_date_constraints(&repo, &number, None, policy)
                .await
                .unwrap();
            assert_eq!(c.min_date, None);
            assert!(c.prev_invoice.is_none());
            assert_eq!(c.max_date, Some(date(2024, 2, 1)));
        }
    }

    #[tokio::test]
    async fn test_gap_only_bridged_by_nearest_policy() {
        let repo = repo_with(vec![
            invoice("AB00000001", date(2024, 3, 1)),
            invoice("AB00000009", date(2024, 3, 9)),
        ])
        .await;
        let number: InvoiceNumber = "AB00000005".parse().unwrap();

        let adjacent = resolve_date_constraints(&repo, &number, None, NeighborPolicy::Adjacent)
            .await
            .unwrap();
        assert_eq!(adjacent, DateConstraints::default());

        let nearest = resolve_date_constraints(&repo, &number, None, NeighborPolicy::Nearest)
            .await
            .unwrap();
        assert_eq!(nearest.min_date, Some(date(2024, 3, 1)));
        assert_eq!(nearest.max_date, Some(date(2024, 3, 9)));
    }

    #[tokio::test]
    async fn test_other_tracks_are_ignored() {
        let repo = repo_with(vec![
            invoice("AA00000004", date(2024, 1, 1)),
            invoice("AC00000006", date(2024, 1, 31)),
        ])
        .await;
        let number: InvoiceNumber = "AB00000005".parse().unwrap();

        let c = resolve_date_constraints(&repo, &number, None, NeighborPolicy::Nearest)
            .await
            .unwrap();
        assert_eq!(c, DateConstraints::default());
    }

    #[tokio::test]
    async fn test_excluded_invoice_does_not_bound_itself() {
        let editing = invoice("AB00000004", date(2024, 1, 10));
        let editing_id = editing.id;
        let repo = repo_with(vec![
            invoice("AB00000002", date(2024, 1, 5)),
            editing,
        ])
        .await;

        // Renumbering AB00000004 to AB00000005: the old record must not count.
        let number: InvoiceNumber = "AB00000005".parse().unwrap();
        let c = resolve_date_constraints(&repo, &number, Some(editing_id), NeighborPolicy::Nearest)
            .await
            .unwrap();
        assert_eq!(c.min_date, Some(date(2024, 1, 5)));

        let c = resolve_date_constraints(&repo, &number, Some(editing_id), NeighborPolicy::Adjacent)
            .await
            .unwrap();
        assert_eq!(c.min_date, None);
    }

    #[tokio::test]
    async fn test_number_itself_is_not_its_own_neighbour() {
        let repo = repo_with(vec![invoice("AB00000005", date(2024, 1, 11))]).await;
        let number: InvoiceNumber = "AB00000005".parse().unwrap();

        let c = resolve_date_constraints(&repo, &number, None, NeighborPolicy::Nearest)
            .await
            .unwrap();
        assert_eq!(c, DateConstraints::default());
    }
}

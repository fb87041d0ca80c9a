//! Ordering of invoices in exported reports

use crate::domain::entities::Invoice;

/// Group by track, then by date, then by number
pub fn sort_for_export(invoices: &mut [Invoice]) {
    invoices.sort_by(|a, b| {
        a.prefix()
            .cmp(b.prefix())
            .then_with(|| a.invoice_date.cmp(&b.invoice_date))
            .then_with(|| a.invoice_number.cmp(&b.invoice_number))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewInvoice;
    use chrono::NaiveDate;

    fn voided(number: &str, day: u32) -> Invoice {
        Invoice::new(NewInvoice {
            invoice_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            invoice_number: number.parse().unwrap(),
            is_voided: true,
            is_blank: false,
            is_dual_format: false,
            customer_code: None,
            buyer: String::new(),
            items: vec![],
        })
        .unwrap()
    }

    #[test]
    fn test_sort_by_prefix_then_date_then_number() {
        let mut invoices = vec![
            voided("BB00000001", 1),
            voided("AB00000003", 2),
            voided("AB00000002", 2),
            voided("AB00000009", 1),
        ];

        sort_for_export(&mut invoices);

        let numbers: Vec<&str> = invoices.iter().map(|i| i.invoice_number.as_str()).collect();
        assert_eq!(
            numbers,
            vec!["AB00000009", "AB00000002", "AB00000003", "BB00000001"]
        );
    }
}

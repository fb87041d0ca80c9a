//! CSV export
//!
//! One row per item. Invoice columns appear only on the first item row and
//! totals only on the last; invoices without items produce no rows.

use ::csv::{Terminator, WriterBuilder};
use tally::Invoice;

use super::{ExportError, HEADERS};

const BOM: &[u8] = "\u{FEFF}".as_bytes();

pub fn render(invoices: &[Invoice]) -> Result<Vec<u8>, ExportError> {
    let mut buf = BOM.to_vec();

    {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buf);

        writer.write_record(HEADERS)?;

        for invoice in invoices {
            let last = invoice.items.len().saturating_sub(1);

            for (index, item) in invoice.items.iter().enumerate() {
                let mut record: Vec<String> = Vec::with_capacity(HEADERS.len());

                if index == 0 {
                    record.push(invoice.invoice_date.format("%Y-%m-%d").to_string());
                    record.push(invoice.invoice_number.clone());
                    record.push(invoice.customer_code.clone().unwrap_or_default());
                    record.push(invoice.buyer.clone());
                } else {
                    record.extend(std::iter::repeat(String::new()).take(4));
                }

                record.push(item.product_name.clone());
                record.push(item.quantity.to_string());
                record.push(item.unit_price.to_string());
                record.push(item.amount.to_string());

                if index == last {
                    record.push(invoice.tax_excluded_amount.to_string());
                    record.push(invoice.tax.to_string());
                    record.push(invoice.tax_included_amount.to_string());
                } else {
                    record.extend(std::iter::repeat(String::new()).take(3));
                }

                writer.write_record(&record)?;
            }
        }

        writer.flush()?;
    }

    Ok(buf)
}

//! Excel (xlsx) export
//!
//! One worksheet. Voided or item-less invoices collapse to a single marker
//! row; multi-item invoices merge their invoice and total columns vertically.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tally::Invoice;

use super::{ExportError, HEADERS};

pub(crate) const SHEET_NAME: &str = "發票清單";
const VOIDED_MARK: &str = "作廢";
const COLUMN_WIDTHS: [f64; 11] = [12.0, 15.0, 12.0, 15.0, 20.0, 10.0, 12.0, 12.0, 12.0, 10.0, 12.0];

/// Columns merged across the item rows of one invoice
const INVOICE_COLUMNS: [u16; 4] = [0, 1, 2, 3];
const TOTAL_COLUMNS: [u16; 3] = [8, 9, 10];

struct Formats {
    header: Format,
    text: Format,
    centered: Format,
    integer: Format,
    price: Format,
}

impl Formats {
    fn new() -> Self {
        let cell = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::VerticalCenter);

        Self {
            header: cell
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(0xD9D9D9))
                .set_align(FormatAlign::Center),
            centered: cell.clone().set_align(FormatAlign::Center),
            integer: cell
                .clone()
                .set_align(FormatAlign::Right)
                .set_num_format("#,##0"),
            price: cell
                .clone()
                .set_align(FormatAlign::Right)
                .set_num_format("#,##0.00"),
            text: cell,
        }
    }
}

fn number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

pub fn render(invoices: &[Invoice]) -> Result<Vec<u8>, ExportError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &formats.header)?;
    }

    let mut row: u32 = 1;
    for invoice in invoices {
        row = if invoice.is_voided || invoice.items.is_empty() {
            write_voided(sheet, &formats, row, invoice)?
        } else {
            write_invoice(sheet, &formats, row, invoice)?
        };
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_voided(
    sheet: &mut Worksheet,
    formats: &Formats,
    row: u32,
    invoice: &Invoice,
) -> Result<u32, XlsxError> {
    sheet.write_string_with_format(row, 0, VOIDED_MARK, &formats.centered)?;
    sheet.write_string_with_format(row, 1, &invoice.invoice_number, &formats.centered)?;
    for col in 2..HEADERS.len() as u16 {
        sheet.write_blank(row, col, &formats.centered)?;
    }
    Ok(row + 1)
}

fn write_invoice(
    sheet: &mut Worksheet,
    formats: &Formats,
    first_row: u32,
    invoice: &Invoice,
) -> Result<u32, XlsxError> {
    let last_row = first_row + invoice.items.len() as u32 - 1;

    for (offset, item) in invoice.items.iter().enumerate() {
        let row = first_row + offset as u32;
        sheet.write_string_with_format(row, 4, &item.product_name, &formats.text)?;
        sheet.write_number_with_format(row, 5, f64::from(item.quantity), &formats.integer)?;
        sheet.write_number_with_format(row, 6, number(item.unit_price), &formats.price)?;
        sheet.write_number_with_format(row, 7, number(item.amount), &formats.integer)?;
    }

    if last_row > first_row {
        for col in INVOICE_COLUMNS {
            sheet.merge_range(first_row, col, last_row, col, "", &formats.centered)?;
        }
        for col in TOTAL_COLUMNS {
            sheet.merge_range(first_row, col, last_row, col, "", &formats.integer)?;
        }
    }

    let date = invoice.invoice_date.format("%Y-%m-%d").to_string();
    let code = invoice.customer_code.as_deref().unwrap_or_default();
    sheet.write_string_with_format(first_row, 0, &date, &formats.centered)?;
    sheet.write_string_with_format(first_row, 1, &invoice.invoice_number, &formats.centered)?;
    sheet.write_string_with_format(first_row, 2, code, &formats.centered)?;
    sheet.write_string_with_format(first_row, 3, &invoice.buyer, &formats.centered)?;

    sheet.write_number_with_format(first_row, 8, number(invoice.tax_excluded_amount), &formats.integer)?;
    sheet.write_number_with_format(first_row, 9, number(invoice.tax), &formats.integer)?;
    sheet.write_number_with_format(first_row, 10, number(invoice.tax_included_amount), &formats.integer)?;

    Ok(last_row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::export::fixtures::invoice;

    #[test]
    fn test_renders_xlsx_archive() {
        let invoices = vec![
            invoice("AB00000001", 3, &[]),
            invoice("AB00000002", 4, &[("Widget", 2, 100), ("Gadget", 1, 50)]),
            invoice("AB00000003", 5, &[("Widget", 1, 10)]),
        ];

        let bytes = render(&invoices).unwrap();

        // xlsx files are zip archives
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_row_cursor_advances_per_item() {
        let formats = Formats::new();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        let multi = invoice("AB00000002", 4, &[("Widget", 2, 100), ("Gadget", 1, 50)]);
        let next = write_invoice(sheet, &formats, 1, &multi).unwrap();
        assert_eq!(next, 3);

        let voided = invoice("AB00000003", 5, &[]);
        assert_eq!(write_voided(sheet, &formats, next, &voided).unwrap(), 4);
    }
}

//! PDF export
//!
//! Rendered in two passes: `layout` places every mark on numbered A4 pages
//! (page breaks included), then `render` draws them with printpdf. Knowing the
//! page count up front lets every page carry a `Page i / n` footer.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use rust_decimal::Decimal;
use tally::{Invoice, InvoiceItem};

use super::ExportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 18.0;
const RIGHT: f32 = 192.0;
const TOP: f32 = 280.0;
/// No new invoice block starts below this line
const INVOICE_FLOOR: f32 = 70.0;
/// No item row is drawn below this line
const ITEM_FLOOR: f32 = 45.0;
const FOOTER_Y: f32 = 12.0;

/// Something drawn on a page, coordinates in millimetres from bottom-left
#[derive(Debug, Clone, PartialEq)]
enum Mark {
    Text {
        text: String,
        size: f32,
        x: f32,
        y: f32,
        bold: bool,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
    },
}

struct Layout {
    pages: Vec<Vec<Mark>>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: TOP,
        }
    }

    fn text(&mut self, text: impl Into<String>, size: f32, x: f32, bold: bool) {
        let mark = Mark::Text {
            text: text.into(),
            size,
            x,
            y: self.y,
            bold,
        };
        self.current().push(mark);
    }

    fn rule(&mut self, x1: f32, x2: f32) {
        let mark = Mark::Rule { x1, x2, y: self.y };
        self.current().push(mark);
    }

    fn current(&mut self) -> &mut Vec<Mark> {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = TOP;
    }

    fn down(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn item_header(&mut self) {
        self.text("Product Name", 8.0, LEFT, true);
        self.text("Quantity", 8.0, 74.0, true);
        self.text("Amount", 8.0, 95.0, true);
        self.text("Unit Price", 8.0, 123.0, true);
        self.down(2.0);
        self.rule(LEFT, 152.0);
        self.down(6.0);
    }

    fn item_row(&mut self, item: &InvoiceItem) {
        self.text(item.product_name.clone(), 7.0, LEFT, false);
        self.text(item.quantity.to_string(), 7.0, 74.0, false);
        self.text(money(item.amount), 7.0, 95.0, false);
        self.text(money(item.unit_price), 7.0, 123.0, false);
        self.down(7.0);
    }

    fn invoice(&mut self, invoice: &Invoice) {
        if self.y < INVOICE_FLOOR {
            self.new_page();
        }

        self.text(format!("Invoice: {}", invoice.invoice_number), 10.0, LEFT, true);
        self.text(
            format!("Date: {}", invoice.invoice_date.format("%Y-%m-%d")),
            10.0,
            106.0,
            true,
        );
        self.down(7.0);

        let code = invoice.customer_code.as_deref().unwrap_or("N/A");
        self.text(format!("Customer Code: {}", code), 10.0, LEFT, false);
        self.text(format!("Buyer: {}", invoice.buyer), 10.0, 106.0, false);
        self.down(10.0);

        self.item_header();
        for item in &invoice.items {
            if self.y < ITEM_FLOOR {
                self.new_page();
                self.item_header();
            }
            self.item_row(item);
        }
        self.down(3.0);

        self.text(
            format!("Tax Excluded: ${}", money(invoice.tax_excluded_amount)),
            9.0,
            123.0,
            true,
        );
        self.down(5.0);
        self.text(format!("Tax (5%): ${}", money(invoice.tax)), 9.0, 123.0, true);
        self.down(5.0);
        self.text(
            format!("Total: ${}", money(invoice.tax_included_amount)),
            9.0,
            123.0,
            true,
        );
        self.down(10.0);

        self.rule(LEFT, RIGHT);
        self.down(7.0);
    }

    /// Append the page footers and hand back the finished pages
    fn finish(mut self) -> Vec<Vec<Mark>> {
        let count = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.push(Mark::Text {
                text: format!("Page {} / {}", index + 1, count),
                size: 8.0,
                x: PAGE_WIDTH / 2.0 - 8.0,
                y: FOOTER_Y,
                bold: false,
            });
        }
        self.pages
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn layout(invoices: &[Invoice]) -> Vec<Vec<Mark>> {
    let mut layout = Layout::new();
    layout.text("Invoice List", 20.0, PAGE_WIDTH / 2.0 - 22.0, true);
    layout.down(18.0);

    for invoice in invoices {
        layout.invoice(invoice);
    }

    layout.finish()
}

fn draw(layer: &PdfLayerReference, marks: &[Mark], font: &IndirectFontRef, bold: &IndirectFontRef) {
    for mark in marks {
        match mark {
            Mark::Text {
                text,
                size,
                x,
                y,
                bold: is_bold,
            } => {
                let face = if *is_bold { bold } else { font };
                layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), face);
            }
            Mark::Rule { x1, x2, y } => {
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x1), Mm(*y)), false),
                        (Point::new(Mm(*x2), Mm(*y)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}

pub fn render(invoices: &[Invoice]) -> Result<Vec<u8>, ExportError> {
    let pages = layout(invoices);

    let (doc, first_page, first_layer) =
        PdfDocument::new("Invoice List", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    for (index, marks) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };
        draw(&layer, marks, &font, &bold);
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

//! Order invoices.

use crate::pdf::{text_width, Font, PdfDocument, PAGE_HEIGHT, PAGE_WIDTH};
use crate::ReportError;
use mart_commerce::cart::{items_total, PricedLine};
use mart_commerce::order::{Order, OrderLine};
use mart_commerce::{Money, OrderId};

const MARGIN: f32 = 50.0;
const TABLE_RIGHT: f32 = 520.0;
const BODY_SIZE: f32 = 12.0;
const LEADING: f32 = 16.0;

/// Table column x positions: product, quantity, price, subtotal.
const COLUMNS: [f32; 4] = [50.0, 250.0, 300.0, 370.0];

/// Everything printed on an invoice.
#[derive(Debug, Clone)]
pub struct InvoiceData {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// `invoice-{id}.pdf`
pub fn filename(id: OrderId) -> String {
    format!("invoice-{id}.pdf")
}

/// Vertical cursor that starts a new page when it runs out of room.
struct Cursor {
    doc: PdfDocument,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            doc: PdfDocument::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Move down one line, breaking the page if needed. Returns true on a break.
    fn advance(&mut self, amount: f32) -> bool {
        self.y -= amount;
        if self.y < MARGIN {
            self.doc.new_page();
            self.y = PAGE_HEIGHT - MARGIN - BODY_SIZE;
            return true;
        }
        false
    }

    fn text(&mut self, x: f32, font: Font, size: f32, text: &str) -> Result<(), ReportError> {
        Ok(self.doc.text(x, self.y, font, size, text)?)
    }

    fn row(&mut self, cells: [&str; 4], font: Font) -> Result<(), ReportError> {
        for (x, cell) in COLUMNS.iter().zip(cells) {
            self.doc.text(*x, self.y, font, BODY_SIZE, cell)?;
        }
        Ok(())
    }

    fn table_header(&mut self) -> Result<(), ReportError> {
        self.row(["Product", "Qty", "Price", "Subtotal"], Font::Bold)?;
        self.y -= LEADING / 2.0;
        self.doc.line(MARGIN, self.y, TABLE_RIGHT, self.y)?;
        Ok(())
    }
}

/// Render an invoice as PDF bytes.
///
/// The grand total is the stored order total, which may differ from the
/// lines plus fee after an admin edit.
pub fn render(data: &InvoiceData) -> Result<Vec<u8>, ReportError> {
    let order = &data.order;
    let mut cur = Cursor::new();

    let title = "Supermarket Invoice";
    cur.y -= 20.0;
    let x = (PAGE_WIDTH - text_width(title, 20.0)) / 2.0;
    cur.text(x, Font::Bold, 20.0, title)?;
    cur.y -= LEADING;

    let date = order.created_at_utc().format("%Y-%m-%d %H:%M UTC").to_string();
    let mut header = vec![
        format!("Invoice #: {}", order.id),
        format!("Date: {date}"),
        format!(
            "Customer: {}",
            data.customer_name.as_deref().unwrap_or("N/A")
        ),
    ];
    if let Some(email) = &data.customer_email {
        header.push(format!("Email: {email}"));
    }
    for line in &header {
        cur.advance(LEADING);
        cur.text(MARGIN, Font::Regular, BODY_SIZE, line)?;
    }

    cur.advance(LEADING * 2.0);
    cur.text(MARGIN, Font::Regular, BODY_SIZE, "Items:")?;
    cur.advance(LEADING * 1.5);
    cur.table_header()?;

    for line in &data.lines {
        if cur.advance(LEADING) {
            cur.table_header()?;
            cur.advance(LEADING);
        }
        let subtotal = line.line_total().ok_or(mart_commerce::CommerceError::Overflow)?;
        cur.row(
            [
                &line.product_name,
                &line.quantity.to_string(),
                &line.price.display(),
                &subtotal.display(),
            ],
            Font::Regular,
        )?;
    }

    let totals = [
        (Font::Regular, BODY_SIZE, format!("Items Total: {}", items_total(&data.lines)?)),
        (
            Font::Regular,
            BODY_SIZE,
            format!("Delivery Fee: {}", order.delivery_fee),
        ),
        (Font::Bold, 14.0, format!("Grand Total: {}", order.total)),
    ];
    cur.advance(LEADING);
    for (font, size, text) in &totals {
        cur.advance(LEADING);
        cur.text(MARGIN, *font, *size, text)?;
    }

    Ok(cur.doc.finish()?)
}

/// Items total and grand total as printed, for callers that show a preview.
pub fn totals(data: &InvoiceData) -> Result<(Money, Money), ReportError> {
    Ok((items_total(&data.lines)?, data.order.total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mart_commerce::checkout::DeliveryMethod;
    use mart_commerce::order::OrderStatus;
    use mart_commerce::{ProductId, UserId};

    fn line(id: i64, name: &str, cents: i64, quantity: i64) -> OrderLine {
        OrderLine {
            id,
            order_id: OrderId::new(12),
            product_id: ProductId::new(id),
            product_name: name.into(),
            quantity,
            price: Money::new(cents),
        }
    }

    fn invoice(lines: Vec<OrderLine>) -> InvoiceData {
        InvoiceData {
            order: Order {
                id: OrderId::new(12),
                user_id: UserId::new(1),
                delivery_address: "1 Main St".into(),
                delivery_method: DeliveryMethod::Express,
                delivery_fee: Money::new(1500),
                total: Money::new(4000),
                status: OrderStatus::Pending,
                created_at: 1_704_067_200,
            },
            lines,
            customer_name: Some("ana".into()),
            customer_email: Some("ana@example.com".into()),
        }
    }

    fn render_text(data: &InvoiceData) -> String {
        String::from_utf8(render(data).unwrap()).unwrap()
    }

    #[test]
    fn test_filename() {
        assert_eq!(filename(OrderId::new(12)), "invoice-12.pdf");
    }

    #[test]
    fn test_invoice_contents() {
        let data = invoice(vec![line(1, "Rice", 1000, 2), line(2, "Tea", 500, 1)]);
        let pdf = render_text(&data);

        for expected in [
            "(Supermarket Invoice)",
            "(Invoice #: 12)",
            "(Date: 2024-01-01 00:00 UTC)",
            "(Customer: ana)",
            "(Email: ana@example.com)",
            "(Rice)",
            "($20.00)",
            "(Items Total: $25.00)",
            "(Delivery Fee: $15.00)",
            "(Grand Total: $40.00)",
        ] {
            assert!(pdf.contains(expected), "missing {expected}");
        }
        assert!(pdf.contains("/Count 1"));
        assert_eq!(
            totals(&data).unwrap(),
            (Money::new(2500), Money::new(4000))
        );
    }

    #[test]
    fn test_missing_customer() {
        let mut data = invoice(vec![line(1, "Rice", 1000, 1)]);
        data.customer_name = None;
        data.customer_email = None;
        let pdf = render_text(&data);
        assert!(pdf.contains("(Customer: N/A)"));
        assert!(!pdf.contains("Email:"));
    }

    #[test]
    fn test_long_invoice_breaks_pages() {
        let lines = (1..=80).map(|i| line(i, "Item", 100, 1)).collect();
        let pdf = render_text(&invoice(lines));
        assert!(!pdf.contains("/Count 1 "));
        assert!(pdf.matches("(Subtotal)").count() >= 2);
    }
}

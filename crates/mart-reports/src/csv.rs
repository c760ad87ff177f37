//! CSV rendering.
//!
//! Rows are joined with `\n` and there is no trailing newline. A field is
//! quoted only when it contains a quote, comma or line break.

use chrono::SecondsFormat;
use mart_auth::Account;
use mart_commerce::catalog::Product;
use mart_commerce::order::OrderWithCustomer;
use std::borrow::Cow;

pub const PRODUCT_HEADER: [&str; 5] = ["Product ID", "Name", "Stock", "Price", "Image"];

pub const ORDER_HEADER: [&str; 7] = [
    "Order ID",
    "User",
    "Status",
    "Total",
    "Delivery Fee",
    "Delivery Address",
    "Created At",
];

pub const USER_HEADER: [&str; 6] = ["User ID", "Username", "Email", "Role", "Contact", "Address"];

/// Quote `value` if it needs it, doubling embedded quotes.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn push_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field.as_ref()));
    }
}

/// Render a header and rows.
pub fn to_csv<S: AsRef<str>>(header: &[&str], rows: impl IntoIterator<Item = Vec<S>>) -> String {
    let mut out = String::new();
    push_record(&mut out, header);
    for row in rows {
        out.push('\n');
        push_record(&mut out, row.as_slice());
    }
    out
}

pub fn products_csv(products: &[Product]) -> String {
    to_csv(
        &PRODUCT_HEADER,
        products.iter().map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.stock.to_string(),
                p.price.display_amount(),
                p.image.clone().unwrap_or_default(),
            ]
        }),
    )
}

pub fn orders_csv(orders: &[OrderWithCustomer]) -> String {
    to_csv(
        &ORDER_HEADER,
        orders.iter().map(|row| {
            let order = &row.order;
            vec![
                order.id.to_string(),
                row.username.clone().unwrap_or_default(),
                order.status.as_str().to_string(),
                order.total.display_amount(),
                order.delivery_fee.display_amount(),
                order.delivery_address.clone(),
                order
                    .created_at_utc()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ]
        }),
    )
}

pub fn users_csv(users: &[Account]) -> String {
    to_csv(
        &USER_HEADER,
        users.iter().map(|u| {
            vec![
                u.id.to_string(),
                u.username.clone(),
                u.email.clone(),
                u.role.as_str().to_string(),
                u.contact.clone(),
                u.address.clone(),
            ]
        }),
    )
}

//! Invoice rendering.

use anyhow::{Context as _, Result};
use mart_commerce::OrderId;
use mart_reports::Reports;

use super::export::write_file;
use super::InvoiceArgs;
use crate::context::Context;

/// Run the invoice command.
pub async fn run(args: InvoiceArgs, ctx: &Context) -> Result<()> {
    let id = OrderId::new(args.order_id);
    let reports = Reports::new(ctx.db().await?);
    let doc = reports
        .invoice(id, None)
        .await
        .with_context(|| format!("Cannot render invoice for order {}", id))?;

    let path = args.output.unwrap_or_else(|| doc.filename.clone());
    write_file(&doc, &path, ctx)
}

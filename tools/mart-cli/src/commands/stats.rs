//! Store figures.

use anyhow::Result;
use mart_commerce::dashboard::Dashboard;

use super::StatsArgs;
use crate::context::Context;
use crate::output::{status_badge, stock_badge};

/// Run the stats command.
pub async fn run(args: StatsArgs, ctx: &Context) -> Result<()> {
    let threshold = args
        .low_stock
        .unwrap_or(ctx.config.catalog.low_stock_threshold);
    let stats = Dashboard::new(ctx.db().await?).store_stats(threshold).await?;

    if ctx.output.is_json() {
        ctx.output.json(&stats);
        return Ok(());
    }

    ctx.output.header("Store");
    ctx.output.kv("Products", &stats.total_products.to_string());
    ctx.output.kv("Orders", &stats.total_orders.to_string());
    ctx.output.kv("Revenue", &stats.total_revenue.display());
    ctx.output.kv("Users", &stats.total_users.to_string());
    for role in &stats.role_breakdown {
        ctx.output.list_item(&format!("{}: {}", role.role, role.count));
    }

    if !stats.monthly_sales.is_empty() {
        ctx.output.header("Monthly sales");
        let widths = [8, 12, 6];
        ctx.output.table_row(&["Month", "Revenue", "Orders"], &widths);
        for month in &stats.monthly_sales {
            ctx.output.table_row(
                &[
                    &month.month,
                    &month.revenue.display(),
                    &month.orders.to_string(),
                ],
                &widths,
            );
        }
    }

    if !stats.recent_orders.is_empty() {
        ctx.output.header("Recent orders");
        let widths = [6, 20, 12, 10];
        ctx.output.table_row(&["ID", "Customer", "Total", "Status"], &widths);
        for row in &stats.recent_orders {
            let customer = row.username.as_deref().unwrap_or("(deleted)");
            ctx.output.table_row(
                &[
                    &row.order.id.to_string(),
                    customer,
                    &row.order.total.display(),
                    &status_badge(row.order.status),
                ],
                &widths,
            );
        }
    }

    ctx.output.header(&format!("Low stock (at or below {})", threshold));
    if stats.low_stock.is_empty() {
        ctx.output.success("Every product is above the threshold");
    }
    for product in &stats.low_stock {
        ctx.output.list_item(&format!(
            "{} ({}): {}",
            product.name,
            product.id,
            stock_badge(product.stock, threshold)
        ));
    }
    Ok(())
}

//! Catalog listing.

use anyhow::Result;
use mart_commerce::catalog::{CatalogParams, CatalogQuery, ProductStore};

use super::{ProductsArgs, ProductsCommand};
use crate::context::Context;
use crate::output::stock_badge;

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ProductsCommand::List { search, stock, sort } => {
            list(CatalogParams { search, stock, sort }, ctx).await
        }
    }
}

async fn list(params: CatalogParams, ctx: &Context) -> Result<()> {
    let query = CatalogQuery::from(params);
    let products = ProductStore::new(ctx.db().await?).list(&query).await?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(&format!("Products ({})", products.len()));
    if products.is_empty() {
        ctx.output.info("No products match");
        return Ok(());
    }

    let widths = [6, 32, 10, 8];
    ctx.output.table_row(&["ID", "Name", "Price", "Stock"], &widths);
    let threshold = ctx.config.catalog.low_stock_threshold;
    for product in &products {
        ctx.output.table_row(
            &[
                &product.id.to_string(),
                &product.name,
                &product.price.display(),
                &stock_badge(product.stock, threshold),
            ],
            &widths,
        );
    }
    Ok(())
}

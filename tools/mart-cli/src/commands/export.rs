//! CSV exports.

use std::io::Write as _;

use anyhow::{Context as _, Result};
use mart_auth::UserParams;
use mart_commerce::catalog::CatalogParams;
use mart_commerce::order::OrderParams;
use mart_reports::{Document, Reports};

use super::{ExportArgs, ExportKind};
use crate::context::Context;

/// Run the export command.
pub async fn run(args: ExportArgs, ctx: &Context) -> Result<()> {
    let reports = Reports::new(ctx.db().await?);
    let doc = match args.kind {
        ExportKind::Products => {
            let params = CatalogParams {
                search: args.search,
                stock: args.stock,
                sort: args.sort,
            };
            reports.products_csv(&params.into()).await?
        }
        ExportKind::Orders => {
            let params = OrderParams {
                search: args.search,
                status: args.status,
                sort: args.sort,
                date_from: args.from,
                date_to: args.to,
            };
            reports.orders_csv(&params.into()).await?
        }
        ExportKind::Users => {
            let params = UserParams {
                search: args.search,
                role: args.role,
                sort: args.sort,
            };
            reports.users_csv(&params.into()).await?
        }
    };

    match args.output {
        Some(path) => write_file(&doc, &path, ctx),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&doc.bytes)?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}

/// Write a rendered document to `path`.
pub fn write_file(doc: &Document, path: &str, ctx: &Context) -> Result<()> {
    std::fs::write(path, &doc.bytes).with_context(|| format!("Failed to write {}", path))?;
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "path": path,
            "content_type": doc.content_type,
            "bytes": doc.bytes.len(),
        }));
    } else {
        ctx.output
            .success(&format!("Wrote {} ({} bytes)", path, doc.bytes.len()));
    }
    Ok(())
}

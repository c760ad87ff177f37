//! Data fetching for exports and invoices.

use crate::invoice::{self, InvoiceData};
use crate::{csv, Document, ReportError};
use mart_auth::{AccountStore, UserQuery};
use mart_commerce::catalog::{CatalogQuery, ProductStore};
use mart_commerce::order::{OrderQuery, OrderStore};
use mart_commerce::{CommerceError, OrderId, UserId};
use mart_db::Db;

#[derive(Clone)]
pub struct Reports {
    products: ProductStore,
    orders: OrderStore,
    accounts: AccountStore,
}

impl Reports {
    pub fn new(db: Db) -> Self {
        Self {
            products: ProductStore::new(db.clone()),
            orders: OrderStore::new(db.clone()),
            accounts: AccountStore::new(db),
        }
    }

    pub async fn products_csv(&self, query: &CatalogQuery) -> Result<Document, ReportError> {
        let products = self.products.list(query).await?;
        tracing::debug!(rows = products.len(), "exporting products");
        Ok(Document::csv("products.csv", csv::products_csv(&products)))
    }

    pub async fn orders_csv(&self, query: &OrderQuery) -> Result<Document, ReportError> {
        let orders = self.orders.list(query).await?;
        tracing::debug!(rows = orders.len(), "exporting orders");
        Ok(Document::csv("orders.csv", csv::orders_csv(&orders)))
    }

    pub async fn users_csv(&self, query: &UserQuery) -> Result<Document, ReportError> {
        let users = self.accounts.list(query).await?;
        tracing::debug!(rows = users.len(), "exporting users");
        Ok(Document::csv("users.csv", csv::users_csv(&users)))
    }

    /// Gather an order, its lines and its customer.
    ///
    /// With `owner` set, orders placed by anyone else are reported as missing.
    pub async fn invoice_data(
        &self,
        id: OrderId,
        owner: Option<UserId>,
    ) -> Result<InvoiceData, ReportError> {
        let row = self.orders.get_with_customer(id).await?;
        if owner.is_some_and(|owner| owner != row.order.user_id) {
            return Err(CommerceError::OrderNotFound(id).into());
        }
        let lines = self.orders.lines(id).await?;
        Ok(InvoiceData {
            order: row.order,
            lines,
            customer_name: row.username,
            customer_email: row.email,
        })
    }

    /// Render the invoice PDF for `id`.
    pub async fn invoice(&self, id: OrderId, owner: Option<UserId>) -> Result<Document, ReportError> {
        let data = self.invoice_data(id, owner).await?;
        let bytes = invoice::render(&data)?;
        tracing::info!(order_id = %id, bytes = bytes.len(), "invoice rendered");
        Ok(Document::pdf(invoice::filename(id), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mart_auth::{AdminUserForm, PasswordHasher};
    use mart_commerce::cart::CartStore;
    use mart_commerce::catalog::ProductDraft;
    use mart_commerce::checkout::{CheckoutForm, DeliveryMethod, OrderPipeline};
    use mart_commerce::Money;

    struct Fixture {
        reports: Reports,
        order: OrderId,
        customer: UserId,
    }

    async fn fixture() -> Fixture {
        let db = Db::open_in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let accounts = AccountStore::new(db.clone()).with_hasher(PasswordHasher::new(256, 1, 1));
        accounts
            .admin_create(&AdminUserForm {
                username: "root".into(),
                email: "root@example.com".into(),
                password: "secret".into(),
                role: "admin".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let customer = accounts
            .admin_create(&AdminUserForm {
                username: "ana, jr".into(),
                email: "ana@example.com".into(),
                password: "secret".into(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;

        let products = ProductStore::new(db.clone());
        let rice = products
            .create(&ProductDraft::new("Rice", Money::new(1000), 10))
            .await
            .unwrap();
        CartStore::new(db.clone())
            .add(customer, rice, 2)
            .await
            .unwrap();
        let placed = OrderPipeline::new(db.clone())
            .place_order(
                customer,
                &CheckoutForm::new(DeliveryMethod::Normal, "1 Main St"),
            )
            .await
            .unwrap();

        Fixture {
            reports: Reports::new(db),
            order: placed.order_id,
            customer,
        }
    }

    #[tokio::test]
    async fn test_exports() {
        let fx = fixture().await;

        let products = fx.reports.products_csv(&CatalogQuery::new()).await.unwrap();
        assert_eq!(products.filename, "products.csv");
        assert_eq!(
            String::from_utf8(products.bytes).unwrap(),
            "Product ID,Name,Stock,Price,Image\n1,Rice,8,10.00,"
        );

        let orders = fx.reports.orders_csv(&OrderQuery::new()).await.unwrap();
        let body = String::from_utf8(orders.bytes).unwrap();
        assert!(body.contains("\"ana, jr\",pending,30.00,10.00,1 Main St,"));

        let users = fx
            .reports
            .users_csv(&UserQuery::new().with_search("ana"))
            .await
            .unwrap();
        assert_eq!(String::from_utf8(users.bytes).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_invoice_is_owner_only() {
        let fx = fixture().await;

        let doc = fx.reports.invoice(fx.order, Some(fx.customer)).await.unwrap();
        assert_eq!(doc.filename, format!("invoice-{}.pdf", fx.order));
        assert_eq!(doc.content_type, Document::PDF);
        assert!(doc.bytes.starts_with(b"%PDF-1.4"));

        // Staff pass no owner.
        assert!(fx.reports.invoice(fx.order, None).await.is_ok());

        let err = fx
            .reports
            .invoice(fx.order, Some(UserId::new(999)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::Commerce(CommerceError::OrderNotFound(_))
        ));
    }
}

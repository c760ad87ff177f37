//! Catalog pages and admin product management.

use crate::error::Result;
use crate::{Reply, Storefront};
use mart_auth::{Role, Session};
use mart_commerce::catalog::{CatalogParams, CatalogQuery, ProductForm, ProductSort, StockBucket};
use mart_commerce::ProductId;
use serde_json::json;
use std::collections::BTreeMap;

const SORTS: [ProductSort; 6] = [
    ProductSort::NameAsc,
    ProductSort::NameDesc,
    ProductSort::StockAsc,
    ProductSort::StockDesc,
    ProductSort::PriceAsc,
    ProductSort::PriceDesc,
];

fn sort_options() -> Vec<serde_json::Value> {
    SORTS
        .iter()
        .map(|sort| json!({ "value": sort, "label": sort.display_name() }))
        .collect()
}

fn product_form_data(form: &ProductForm) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("name".to_string(), form.name.clone()),
        ("stock".to_string(), form.stock.clone()),
        ("price".to_string(), form.price.clone()),
    ])
}

impl Storefront {
    /// `GET /inventory`: the admin product table.
    pub async fn inventory(&self, session: &mut Session, params: CatalogParams) -> Result<Reply> {
        guard!(session, require_admin);
        let products = self.products.list(&CatalogQuery::from(params.clone())).await?;
        let page = json!({
            "products": products,
            "params": params,
            "sorts": sort_options(),
            "stock_buckets": [StockBucket::Low, StockBucket::Medium, StockBucket::High],
            "low_stock_threshold": self.low_stock_threshold,
        });
        self.render(session, "inventory", page).await
    }

    /// `GET /shopping`: the customer catalog.
    pub async fn shopping(&self, session: &mut Session, params: CatalogParams) -> Result<Reply> {
        guard!(session, require_user);
        let products = self.products.list(&CatalogQuery::from(params.clone())).await?;
        let page = json!({
            "products": products,
            "params": params,
            "sorts": sort_options(),
        });
        self.render(session, "shopping", page).await
    }

    /// `GET /product/:id`
    pub async fn product(&self, session: &mut Session, id: ProductId) -> Result<Reply> {
        guard!(session, require_user);
        let back = if session.user.has_role(Role::Admin) {
            "/inventory"
        } else {
            "/shopping"
        };
        let product = recover!(session, self.products.get(id).await, back);
        self.render(session, "product", json!({ "product": product })).await
    }

    /// `GET /addProduct`
    pub async fn add_product_page(&self, session: &mut Session) -> Result<Reply> {
        guard!(session, require_admin);
        let form = session.take_form();
        self.render(session, "addProduct", json!({ "form": form })).await
    }

    /// `POST /addProduct`
    pub async fn add_product(&self, session: &mut Session, form: ProductForm) -> Result<Reply> {
        guard!(session, require_admin);
        let kept = product_form_data(&form);
        let draft = match form.into_draft() {
            Ok(draft) => draft,
            Err(err) => {
                session.keep_form(kept);
                return crate::app::recover(session, err, "/addProduct");
            }
        };
        self.products.create(&draft).await?;
        Ok(Reply::redirect("/inventory"))
    }

    /// `GET /updateProduct/:id`
    pub async fn update_product_page(&self, session: &mut Session, id: ProductId) -> Result<Reply> {
        guard!(session, require_admin);
        let product = recover!(session, self.products.get(id).await, "/inventory");
        self.render(session, "updateProduct", json!({ "product": product })).await
    }

    /// `POST /updateProduct/:id`
    ///
    /// Without a new image the current one is kept.
    pub async fn update_product(
        &self,
        session: &mut Session,
        id: ProductId,
        form: ProductForm,
    ) -> Result<Reply> {
        guard!(session, require_admin);
        let draft = recover!(session, form.into_draft(), format!("/updateProduct/{id}"));
        recover!(session, self.products.update(id, &draft).await, "/inventory");
        Ok(Reply::redirect("/inventory"))
    }

    /// `POST /deleteProduct/:id`
    pub async fn delete_product(&self, session: &mut Session, id: ProductId) -> Result<Reply> {
        guard!(session, require_admin);
        recover!(session, self.products.delete(id).await, "/inventory");
        Ok(Reply::redirect("/inventory"))
    }

    /// `GET /admin/export/products`: the filtered inventory as CSV.
    pub async fn export_products(&self, session: &mut Session, params: CatalogParams) -> Result<Reply> {
        guard!(session, require_admin);
        let doc = self.reports.products_csv(&CatalogQuery::from(params)).await?;
        Ok(Reply::Download(doc))
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::*;
    use mart_auth::{FlashLevel, Session};
    use mart_commerce::catalog::{CatalogParams, ProductForm};
    use mart_commerce::ProductId;

    fn params(search: Option<&str>, stock: Option<&str>, sort: Option<&str>) -> CatalogParams {
        CatalogParams {
            search: search.map(Into::into),
            stock: stock.map(Into::into),
            sort: sort.map(Into::into),
        }
    }

    fn names(reply: &crate::Reply) -> Vec<String> {
        reply.context().unwrap()["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_shopping_filters_and_sorts() {
        let h = harness().await;
        h.product("Apples", 300, 25).await;
        h.product("Green Tea", 450, 3).await;
        h.product("Black Tea", 500, 12).await;
        let (mut session, _) = h.session("ana", "user").await;

        let reply = h.shop.shopping(&mut session, CatalogParams::default()).await.unwrap();
        assert_eq!(reply.view(), Some("shopping"));
        assert_eq!(names(&reply), vec!["Apples", "Black Tea", "Green Tea"]);

        let reply = h
            .shop
            .shopping(&mut session, params(Some("tea"), None, Some("price_desc")))
            .await
            .unwrap();
        assert_eq!(names(&reply), vec!["Black Tea", "Green Tea"]);

        let reply = h
            .shop
            .shopping(&mut session, params(Some("tea"), Some("low"), None))
            .await
            .unwrap();
        assert_eq!(names(&reply), vec!["Green Tea"]);
    }

    #[tokio::test]
    async fn test_inventory_is_admin_only() {
        let h = harness().await;

        let mut anonymous = Session::anonymous();
        let reply = h.shop.inventory(&mut anonymous, CatalogParams::default()).await.unwrap();
        assert_redirect(&reply, "/login");
        assert_eq!(
            flashes(&mut anonymous, FlashLevel::Error),
            vec!["Please log in to view this page."]
        );

        let (mut customer, _) = h.session("ana", "user").await;
        let reply = h.shop.inventory(&mut customer, CatalogParams::default()).await.unwrap();
        assert_redirect(&reply, "/shopping");
        assert_eq!(flashes(&mut customer, FlashLevel::Error), vec!["Access denied."]);

        let (mut logistics, _) = h.session("lee", "logistics").await;
        let reply = h.shop.inventory(&mut logistics, CatalogParams::default()).await.unwrap();
        assert_redirect(&reply, "/shopping");

        let mut admin = h.admin_session();
        let reply = h.shop.inventory(&mut admin, CatalogParams::default()).await.unwrap();
        assert_eq!(reply.view(), Some("inventory"));
        assert_eq!(reply.context().unwrap()["low_stock_threshold"], 10);
    }

    #[tokio::test]
    async fn test_product_crud() {
        let h = harness().await;
        let mut admin = h.admin_session();

        let form = ProductForm {
            name: "Rice".into(),
            stock: "-4".into(),
            price: "12.5".into(),
            image: Some("rice.png".into()),
            current_image: None,
        };
        let reply = h.shop.add_product(&mut admin, form).await.unwrap();
        assert_redirect(&reply, "/inventory");

        let id = ProductId::new(1);
        let reply = h.shop.product(&mut admin, id).await.unwrap();
        let product = &reply.context().unwrap()["product"];
        assert_eq!(product["name"], "Rice");
        assert_eq!(product["stock"], 0);
        assert_eq!(product["image"], "rice.png");

        let update = ProductForm {
            name: "Brown Rice".into(),
            stock: "8".into(),
            price: "13".into(),
            image: None,
            current_image: Some("rice.png".into()),
        };
        let reply = h.shop.update_product(&mut admin, id, update).await.unwrap();
        assert_redirect(&reply, "/inventory");
        assert_eq!(h.stock(id).await, 8);

        let reply = h.shop.delete_product(&mut admin, id).await.unwrap();
        assert_redirect(&reply, "/inventory");

        let reply = h.shop.update_product_page(&mut admin, id).await.unwrap();
        assert_redirect(&reply, "/inventory");
        assert_eq!(flashes(&mut admin, FlashLevel::Error), vec!["Product not found."]);
    }

    #[tokio::test]
    async fn test_add_product_requires_name() {
        let h = harness().await;
        let mut admin = h.admin_session();
        let form = ProductForm {
            name: "  ".into(),
            stock: "5".into(),
            price: "1".into(),
            ..Default::default()
        };
        let reply = h.shop.add_product(&mut admin, form).await.unwrap();
        assert_redirect(&reply, "/addProduct");
        assert_eq!(
            flashes(&mut admin, FlashLevel::Error),
            vec!["Product name is required."]
        );

        let page = h.shop.add_product_page(&mut admin).await.unwrap();
        assert_eq!(page.context().unwrap()["form"]["stock"], "5");
    }

    #[tokio::test]
    async fn test_export_products() {
        let h = harness().await;
        h.product("Eggs, dozen", 450, 12).await;
        let mut admin = h.admin_session();

        let reply = h.shop.export_products(&mut admin, CatalogParams::default()).await.unwrap();
        let doc = reply.document().unwrap();
        assert_eq!(doc.filename, "products.csv");
        assert_eq!(
            String::from_utf8(doc.bytes.clone()).unwrap(),
            "Product ID,Name,Stock,Price,Image\n1,\"Eggs, dozen\",12,4.50,"
        );
    }
}

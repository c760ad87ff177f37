//! Cart pages.

use crate::error::Result;
use crate::{Reply, Storefront};
use mart_auth::Session;
use mart_commerce::cart::{parse_add_quantity, parse_update_quantity};
use mart_commerce::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The quantity field of the add and update cart forms, as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityForm {
    pub quantity: Option<String>,
}

impl QuantityForm {
    pub fn new(quantity: impl Into<String>) -> Self {
        Self {
            quantity: Some(quantity.into()),
        }
    }
}

impl Storefront {
    /// `GET /cart`
    pub async fn cart(&self, session: &mut Session) -> Result<Reply> {
        let user = guard!(session, require_user);
        let cart = self.carts.cart(user).await?;
        let subtotal = cart.subtotal()?;
        self.render(session, "cart", json!({ "cart": cart, "subtotal": subtotal }))
            .await
    }

    /// `POST /add-to-cart/:id`
    pub async fn add_to_cart(
        &self,
        session: &mut Session,
        id: ProductId,
        form: QuantityForm,
    ) -> Result<Reply> {
        let user = guard!(session, require_user);
        let quantity = recover!(
            session,
            parse_add_quantity(form.quantity.as_deref()),
            "/shopping"
        );
        let added = recover!(session, self.carts.add(user, id, quantity).await, "/shopping");
        session.flash_success(format!(
            "Added {} \u{d7} {} to cart",
            added.added, added.product.name
        ));
        Ok(Reply::redirect("/shopping"))
    }

    /// `POST /update-cart/:id`
    pub async fn update_cart(
        &self,
        session: &mut Session,
        id: ProductId,
        form: QuantityForm,
    ) -> Result<Reply> {
        let user = guard!(session, require_user);
        let quantity = parse_update_quantity(form.quantity.as_deref());
        recover!(session, self.carts.set_quantity(user, id, quantity).await, "/cart");
        session.flash_success("Quantity updated!");
        Ok(Reply::redirect("/cart"))
    }

    /// `POST /remove-from-cart/:id`
    pub async fn remove_from_cart(&self, session: &mut Session, id: ProductId) -> Result<Reply> {
        let user = guard!(session, require_user);
        self.carts.remove(user, id).await?;
        Ok(Reply::redirect("/cart"))
    }

    /// `POST /clear-cart`
    pub async fn clear_cart(&self, session: &mut Session) -> Result<Reply> {
        let user = guard!(session, require_user);
        self.carts.clear(user).await?;
        session.flash_success("All items removed from your cart.");
        Ok(Reply::redirect("/cart"))
    }
}

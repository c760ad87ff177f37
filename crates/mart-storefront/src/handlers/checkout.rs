//! Checkout, order history and customer invoices.

use crate::app::recover;
use crate::error::Result;
use crate::{Reply, Storefront};
use mart_auth::Session;
use mart_commerce::cart::items_total;
use mart_commerce::checkout::{CheckoutForm, DeliveryMethod, OrderQuote, STOCK_UPDATE_WARNING};
use mart_commerce::{CommerceError, OrderId};
use serde_json::json;

const METHODS: [DeliveryMethod; 3] = [
    DeliveryMethod::Pickup,
    DeliveryMethod::Normal,
    DeliveryMethod::Express,
];

impl Storefront {
    /// `GET /checkout`: the cart priced for each delivery method.
    pub async fn checkout_page(&self, session: &mut Session) -> Result<Reply> {
        let user = guard!(session, require_user);
        let cart = self.carts.cart(user).await?;
        if cart.is_empty() {
            session.flash_error(CommerceError::EmptyCart.to_string());
            return Ok(Reply::redirect("/cart"));
        }

        let mut options = Vec::with_capacity(METHODS.len());
        for method in METHODS {
            let quote = OrderQuote::for_cart(&cart, method)?;
            options.push(json!({
                "method": method,
                "label": method.display_name(),
                "requires_address": method.requires_address(),
                "quote": quote,
            }));
        }
        let account = self.accounts.get(user).await?;
        let page = json!({
            "cart": cart,
            "options": options,
            "default_method": DeliveryMethod::default(),
            "address": account.address,
        });
        self.render(session, "checkout", page).await
    }

    /// `POST /place-order`
    ///
    /// A rolled-back order is reported to the customer rather than failing
    /// the request, since nothing was written.
    pub async fn place_order(&self, session: &mut Session, form: CheckoutForm) -> Result<Reply> {
        let user = guard!(session, require_user);
        match self.pipeline.place_order(user, &form).await {
            Ok(placed) => {
                if placed.stock_update_failed {
                    session.flash_error(STOCK_UPDATE_WARNING);
                }
                session.flash_success("Order placed successfully!");
                Ok(Reply::redirect(placed.detail_path()))
            }
            Err(err @ CommerceError::EmptyCart) => recover(session, err, "/cart"),
            Err(CommerceError::OrderCreationFailed(reason)) => {
                tracing::error!(user_id = %user, %reason, "order not placed");
                session.flash_error("Failed to place order.");
                Ok(Reply::redirect("/checkout"))
            }
            Err(err) => recover(session, err, "/checkout"),
        }
    }

    /// `GET /orders`: the caller's orders, newest first.
    pub async fn orders(&self, session: &mut Session) -> Result<Reply> {
        let user = guard!(session, require_user);
        let orders = self.orders.list_for_user(user).await?;
        self.render(session, "orders", json!({ "orders": orders })).await
    }

    /// `GET /orders/:id`
    pub async fn order_detail(&self, session: &mut Session, id: OrderId) -> Result<Reply> {
        let user = guard!(session, require_user);
        let order = recover!(session, self.orders.get_for_user(id, user).await, "/orders");
        let lines = self.orders.lines(id).await?;
        let subtotal = items_total(&lines)?;
        let page = json!({ "order": order, "lines": lines, "items_total": subtotal });
        self.render(session, "orderDetails", page).await
    }

    /// `GET /orders/:id/invoice`
    pub async fn order_invoice(&self, session: &mut Session, id: OrderId) -> Result<Reply> {
        let user = guard!(session, require_user);
        let doc = recover!(session, self.reports.invoice(id, Some(user)).await, "/orders");
        Ok(Reply::Download(doc))
    }
}

//! The storefront service and the plumbing shared by its handlers.

use crate::config::AppConfig;
use crate::error::{Classified, Result};
use crate::reply::Reply;
use mart_auth::{AccountStore, AuthError, Session};
use mart_commerce::cart::CartStore;
use mart_commerce::catalog::ProductStore;
use mart_commerce::checkout::OrderPipeline;
use mart_commerce::dashboard::Dashboard;
use mart_commerce::order::OrderStore;
use mart_db::Db;
use mart_reports::Reports;
use serde_json::{Map, Value};

/// All storefront routes over one database.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct Storefront {
    pub(crate) products: ProductStore,
    pub(crate) carts: CartStore,
    pub(crate) orders: OrderStore,
    pub(crate) pipeline: OrderPipeline,
    pub(crate) accounts: AccountStore,
    pub(crate) dashboard: Dashboard,
    pub(crate) reports: Reports,
    pub(crate) low_stock_threshold: i64,
}

impl Storefront {
    pub fn new(db: Db, config: &AppConfig) -> Self {
        let accounts = AccountStore::new(db.clone())
            .with_hasher(config.hasher())
            .allow_staff_self_registration(config.accounts.allow_staff_self_registration);
        Self {
            products: ProductStore::new(db.clone()),
            carts: CartStore::new(db.clone()),
            orders: OrderStore::new(db.clone()),
            pipeline: OrderPipeline::new(db.clone()),
            dashboard: Dashboard::new(db.clone()),
            reports: Reports::new(db),
            accounts,
            low_stock_threshold: config.catalog.low_stock_threshold,
        }
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Render `view` with `page` merged into the layout context: the current
    /// user, pending flashes and the cart badge count.
    pub(crate) async fn render(
        &self,
        session: &mut Session,
        view: &'static str,
        page: Value,
    ) -> Result<Reply> {
        let mut context = match page {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("page".to_string(), other)]),
        };
        let cart_count = self.cart_count(session).await;
        context.insert("user".into(), serde_json::to_value(&session.user)?);
        context.insert("flashes".into(), serde_json::to_value(session.take_flashes())?);
        context.insert("cart_count".into(), cart_count.into());
        Ok(Reply::Render {
            view,
            context: Value::Object(context),
        })
    }

    /// Units in the caller's cart. Anonymous visitors and load failures
    /// show zero.
    async fn cart_count(&self, session: &Session) -> i64 {
        let Some(user) = session.user.user_id() else {
            return 0;
        };
        match self.carts.count(user).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(user_id = %user, error = %e, "failed to load cart count");
                0
            }
        }
    }
}

/// Flash a failed guard and send the visitor to log in, or back to the
/// shop when they are logged in with the wrong role.
pub(crate) fn deny(session: &mut Session, err: AuthError) -> Reply {
    let target = match err {
        AuthError::Unauthenticated => "/login",
        _ => "/shopping",
    };
    tracing::debug!(error = %err, target, "guard refused request");
    session.flash_error(err.to_string());
    Reply::redirect(target)
}

/// Flash a recoverable error and redirect to `back`. Anything else fails
/// the request.
pub(crate) fn recover<E: Classified>(
    session: &mut Session,
    err: E,
    back: impl Into<String>,
) -> Result<Reply> {
    let kind = err.kind();
    if !kind.is_recoverable() {
        return Err(err.into());
    }
    tracing::debug!(%kind, error = %err, "recovered as flash");
    session.flash_error(err.to_string());
    Ok(Reply::redirect(back))
}

//! Staff pages: order management, user administration, the store dashboard
//! and exports.
//!
//! Order pages admit admin and logistics staff; user pages are admin only.

use crate::app::recover;
use crate::error::Result;
use crate::{Reply, Storefront};
use mart_auth::{AdminUserForm, AdminUserUpdateForm, AuthError, Role, Session, UserParams, UserQuery};
use mart_commerce::cart::items_total;
use mart_commerce::order::{OrderParams, OrderQuery, OrderStatus, OrderUpdateForm};
use mart_commerce::{OrderId, UserId};
use serde_json::json;
use std::collections::BTreeMap;

fn user_form_data(form: &AdminUserForm) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("username".to_string(), form.username.clone()),
        ("email".to_string(), form.email.clone()),
        ("role".to_string(), form.role.clone()),
        ("address".to_string(), form.address.clone()),
        ("contact".to_string(), form.contact.clone()),
    ])
}

impl Storefront {
    /// `GET /admin/orders`
    pub async fn admin_orders(&self, session: &mut Session, params: OrderParams) -> Result<Reply> {
        guard!(session, require_staff);
        let orders = self.orders.list(&OrderQuery::from(params.clone())).await?;
        let page = json!({
            "orders": orders,
            "params": params,
            "statuses": OrderStatus::ALL,
        });
        self.render(session, "adminOrders", page).await
    }

    /// `GET /admin/export/orders`: the filtered order list as CSV.
    pub async fn export_orders(&self, session: &mut Session, params: OrderParams) -> Result<Reply> {
        guard!(session, require_staff);
        let doc = self.reports.orders_csv(&OrderQuery::from(params)).await?;
        Ok(Reply::Download(doc))
    }

    /// `GET /admin/orders/:id`
    pub async fn admin_order(&self, session: &mut Session, id: OrderId) -> Result<Reply> {
        guard!(session, require_staff);
        let order = recover!(session, self.orders.get_with_customer(id).await, "/admin/orders");
        let lines = self.orders.lines(id).await?;
        let subtotal = items_total(&lines)?;
        let page = json!({ "order": order, "lines": lines, "items_total": subtotal });
        self.render(session, "adminOrderDetails", page).await
    }

    /// `GET /admin/orders/:id/invoice`
    pub async fn admin_order_invoice(&self, session: &mut Session, id: OrderId) -> Result<Reply> {
        guard!(session, require_staff);
        let doc = recover!(session, self.reports.invoice(id, None).await, "/admin/orders");
        Ok(Reply::Download(doc))
    }

    /// `GET /admin/orders/edit/:id`
    pub async fn edit_order_page(&self, session: &mut Session, id: OrderId) -> Result<Reply> {
        guard!(session, require_staff);
        let order = recover!(session, self.orders.get_with_customer(id).await, "/admin/orders");
        let page = json!({ "order": order, "statuses": OrderStatus::ALL });
        self.render(session, "editOrder", page).await
    }

    /// `POST /admin/orders/edit/:id`
    ///
    /// The total is recomputed from the stored lines plus the submitted fee.
    pub async fn update_order(
        &self,
        session: &mut Session,
        id: OrderId,
        form: OrderUpdateForm,
    ) -> Result<Reply> {
        let staff = guard!(session, require_staff);
        let update = recover!(session, form.validate(), format!("/admin/orders/edit/{id}"));
        recover!(session, self.orders.update(id, &update).await, "/admin/orders");
        tracing::debug!(order_id = %id, by = %staff, "order edited by staff");
        session.flash_success("Order updated successfully!");
        Ok(Reply::redirect(format!("/admin/orders/{id}")))
    }

    /// `GET /admin/users`
    pub async fn admin_users(&self, session: &mut Session, params: UserParams) -> Result<Reply> {
        guard!(session, require_admin);
        let users = self.accounts.list(&UserQuery::from(params.clone())).await?;
        let page = json!({ "users": users, "params": params, "roles": Role::ALL });
        self.render(session, "adminUsers", page).await
    }

    /// `GET /admin/export/users`
    pub async fn export_users(&self, session: &mut Session, params: UserParams) -> Result<Reply> {
        guard!(session, require_admin);
        let doc = self.reports.users_csv(&UserQuery::from(params)).await?;
        Ok(Reply::Download(doc))
    }

    /// `GET /admin/users/add`
    pub async fn add_user_page(&self, session: &mut Session) -> Result<Reply> {
        guard!(session, require_admin);
        let form = session.take_form();
        self.render(session, "addUser", json!({ "form": form, "roles": Role::ALL })).await
    }

    /// `POST /admin/users/add`
    pub async fn add_user(&self, session: &mut Session, form: AdminUserForm) -> Result<Reply> {
        guard!(session, require_admin);
        match self.accounts.admin_create(&form).await {
            Ok(_) => {
                session.flash_success("New user added!");
                Ok(Reply::redirect("/admin/users"))
            }
            Err(AuthError::LastAdminProtected) => {
                session.flash_error("You must have at least one admin. Create an admin account first.");
                session.keep_form(user_form_data(&form));
                Ok(Reply::redirect("/admin/users/add"))
            }
            Err(err) => {
                if err.kind().is_recoverable() {
                    session.keep_form(user_form_data(&form));
                }
                recover(session, err, "/admin/users/add")
            }
        }
    }

    /// `GET /admin/users/edit/:id`
    pub async fn edit_user_page(&self, session: &mut Session, id: UserId) -> Result<Reply> {
        guard!(session, require_admin);
        let account = recover!(session, self.accounts.get(id).await, "/admin/users");
        self.render(session, "editUser", json!({ "account": account, "roles": Role::ALL }))
            .await
    }

    /// `POST /admin/users/edit/:id`
    pub async fn update_user(
        &self,
        session: &mut Session,
        id: UserId,
        form: AdminUserUpdateForm,
    ) -> Result<Reply> {
        guard!(session, require_admin);
        let back = format!("/admin/users/edit/{id}");
        match self.accounts.admin_update(id, &form).await {
            Ok(account) => {
                session.refresh_user(&account);
                session.flash_success("User updated!");
                Ok(Reply::redirect("/admin/users"))
            }
            Err(AuthError::LastAdminProtected) => {
                session.flash_error(
                    "At least one admin must remain. Promote another admin before changing this role.",
                );
                Ok(Reply::redirect(back))
            }
            Err(err @ AuthError::UserNotFound(_)) => recover(session, err, "/admin/users"),
            Err(err) => recover(session, err, back),
        }
    }

    /// `POST /admin/users/delete/:id`
    pub async fn delete_user(&self, session: &mut Session, id: UserId) -> Result<Reply> {
        guard!(session, require_admin);
        match self.accounts.admin_delete(id).await {
            Ok(()) => session.flash_success("User deleted."),
            Err(AuthError::LastAdminProtected) => session.flash_error(
                "At least one admin must remain. Create another admin before deleting this account.",
            ),
            Err(err) => return recover(session, err, "/admin/users"),
        }
        Ok(Reply::redirect("/admin/users"))
    }

    /// `GET /admin/dashboard`: store-wide figures.
    pub async fn admin_dashboard(&self, session: &mut Session) -> Result<Reply> {
        guard!(session, require_staff);
        let stats = self.dashboard.store_stats(self.low_stock_threshold).await?;
        self.render(session, "adminDashboard", json!({ "stats": stats })).await
    }
}

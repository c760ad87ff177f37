//! Home, registration, login and logout.

use crate::app::recover;
use crate::error::Result;
use crate::{Reply, Storefront};
use mart_auth::{AuthError, LoginForm, RegistrationForm, Session};
use serde_json::json;
use std::collections::BTreeMap;

impl Storefront {
    /// `GET /`
    pub async fn home(&self, session: &mut Session) -> Result<Reply> {
        self.render(session, "index", json!({})).await
    }

    /// `GET /register`
    pub async fn register_page(&self, session: &mut Session) -> Result<Reply> {
        let form = session.take_form();
        self.render(session, "register", json!({ "form": form })).await
    }

    /// `POST /register`
    ///
    /// On failure the submitted values, minus the password, are kept for
    /// the form to re-display.
    pub async fn register(&self, session: &mut Session, form: RegistrationForm) -> Result<Reply> {
        match self.accounts.register(&form).await {
            Ok(_) => {
                session.flash_success("Registration successful! Please log in.");
                Ok(Reply::redirect("/login"))
            }
            Err(AuthError::EmailExists) => {
                session.flash_error("Email already exists, please login.");
                session.keep_form(form.to_form_data());
                Ok(Reply::redirect("/register"))
            }
            Err(err) => {
                if err.kind().is_recoverable() {
                    session.keep_form(form.to_form_data());
                }
                recover(session, err, "/register")
            }
        }
    }

    /// `GET /login`
    pub async fn login_page(&self, session: &mut Session) -> Result<Reply> {
        let form = session.take_form();
        self.render(session, "login", json!({ "form": form })).await
    }

    /// `POST /login`
    ///
    /// Sends each role to its landing page.
    pub async fn login(&self, session: &mut Session, form: LoginForm) -> Result<Reply> {
        match self.accounts.authenticate(&form).await {
            Ok(account) => {
                session.login(&account);
                session.flash_success("Login successful!");
                Ok(Reply::redirect(account.role.landing_path()))
            }
            Err(err) => {
                if err.kind().is_recoverable() {
                    session.keep_form(BTreeMap::from([("email".to_string(), form.email.clone())]));
                }
                recover(session, err, "/login")
            }
        }
    }

    /// `GET /logout`
    pub async fn logout(&self, session: &mut Session) -> Result<Reply> {
        if let Some(id) = session.user.user_id() {
            tracing::debug!(user_id = %id, "logged out");
        }
        session.logout();
        Ok(Reply::redirect("/"))
    }
}

//! Profile, password and the customer dashboard.

use crate::app::recover;
use crate::error::Result;
use crate::{Reply, Storefront};
use mart_auth::{AuthError, PasswordChangeForm, ProfileForm, Session};
use serde_json::json;

impl Storefront {
    /// `GET /profile`
    pub async fn profile(&self, session: &mut Session) -> Result<Reply> {
        let user = guard!(session, require_user);
        let account = self.accounts.get(user).await?;
        self.render(session, "profile", json!({ "account": account })).await
    }

    /// `POST /profile/update`
    pub async fn update_profile(&self, session: &mut Session, form: ProfileForm) -> Result<Reply> {
        let user = guard!(session, require_user);
        match self.accounts.update_profile(user, &form).await {
            Ok(account) => {
                session.refresh_user(&account);
                session.flash_success("Profile updated successfully.");
                Ok(Reply::redirect("/profile"))
            }
            Err(AuthError::EmailExists) => {
                session.flash_error("Email already exists. Please use another email.");
                Ok(Reply::redirect("/profile"))
            }
            Err(err) => recover(session, err, "/profile"),
        }
    }

    /// `GET /password`
    pub async fn password_page(&self, session: &mut Session) -> Result<Reply> {
        guard!(session, require_user);
        self.render(session, "password", json!({})).await
    }

    /// `POST /change-password`
    pub async fn change_password(
        &self,
        session: &mut Session,
        form: PasswordChangeForm,
    ) -> Result<Reply> {
        let user = guard!(session, require_user);
        match self.accounts.change_password(user, &form).await {
            Ok(()) => {
                session.flash_success("Password updated successfully.");
                Ok(Reply::redirect("/password"))
            }
            Err(AuthError::WeakPassword) => {
                session.flash_error("New password must be at least 6 characters.");
                Ok(Reply::redirect("/password"))
            }
            Err(err) => recover(session, err, "/password"),
        }
    }

    /// `GET /dashboard`: the caller's order figures.
    pub async fn dashboard(&self, session: &mut Session) -> Result<Reply> {
        let user = guard!(session, require_user);
        let stats = self.dashboard.customer_stats(user).await?;
        self.render(session, "dashboard", json!({ "stats": stats })).await
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::*;
    use crate::QuantityForm;
    use mart_auth::{FlashLevel, LoginForm, PasswordChangeForm, ProfileForm, Session};
    use mart_commerce::checkout::{CheckoutForm, DeliveryMethod};

    fn profile(email: &str) -> ProfileForm {
        ProfileForm {
            username: "Ana B".into(),
            email: email.into(),
            contact: "5550199".into(),
            address: "2 High St".into(),
        }
    }

    fn password_change(old: &str, new: &str, confirm: &str) -> PasswordChangeForm {
        PasswordChangeForm {
            old_password: old.into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }

    #[tokio::test]
    async fn test_update_profile() {
        let h = harness().await;
        let (mut session, _) = h.session("ana", "user").await;

        let reply = h
            .shop
            .update_profile(&mut session, profile("root@example.com"))
            .await
            .unwrap();
        assert_redirect(&reply, "/profile");
        assert_eq!(
            flashes(&mut session, FlashLevel::Error),
            vec!["Email already exists. Please use another email."]
        );

        let reply = h
            .shop
            .update_profile(&mut session, profile("ana.b@example.com"))
            .await
            .unwrap();
        assert_redirect(&reply, "/profile");
        assert_eq!(
            flashes(&mut session, FlashLevel::Success),
            vec!["Profile updated successfully."]
        );
        assert_eq!(session.user.display_name(), "Ana B");

        let page = h.shop.profile(&mut session).await.unwrap();
        let account = &page.context().unwrap()["account"];
        assert_eq!(account["email"], "ana.b@example.com");
        assert_eq!(account["address"], "2 High St");
    }

    #[tokio::test]
    async fn test_change_password_rules() {
        let h = harness().await;
        let (mut session, _) = h.session("ana", "user").await;

        for (form, message) in [
            (password_change("secret", "abc", "abc"), "New password must be at least 6 characters."),
            (password_change("secret", "newpass", "other1"), "New passwords do not match."),
            (password_change("wrong!", "newpass", "newpass"), "Old password is incorrect."),
            (
                password_change("secret", "secret", "secret"),
                "New password cannot be the same as old password.",
            ),
        ] {
            let reply = h.shop.change_password(&mut session, form).await.unwrap();
            assert_redirect(&reply, "/password");
            assert_eq!(flashes(&mut session, FlashLevel::Error), vec![message]);
        }

        let reply = h
            .shop
            .change_password(&mut session, password_change("secret", "newpass", "newpass"))
            .await
            .unwrap();
        assert_redirect(&reply, "/password");
        assert_eq!(
            flashes(&mut session, FlashLevel::Success),
            vec!["Password updated successfully."]
        );

        let mut fresh = Session::anonymous();
        let reply = h
            .shop
            .login(
                &mut fresh,
                LoginForm {
                    email: "ana@example.com".into(),
                    password: "newpass".into(),
                },
            )
            .await
            .unwrap();
        assert_redirect(&reply, "/shopping");
    }

    #[tokio::test]
    async fn test_customer_dashboard() {
        let h = harness().await;
        let rice = h.product("Rice", 1000, 10).await;
        let (mut session, _) = h.session("ana", "user").await;
        h.shop
            .add_to_cart(&mut session, rice, QuantityForm::new("3"))
            .await
            .unwrap();
        h.shop
            .place_order(&mut session, CheckoutForm::new(DeliveryMethod::Normal, "1 Main St"))
            .await
            .unwrap();

        let page = h.shop.dashboard(&mut session).await.unwrap();
        let stats = &page.context().unwrap()["stats"];
        assert_eq!(stats["total_orders"], 1);
        assert_eq!(stats["total_spent"], 4000);
        assert_eq!(stats["total_items_bought"], 3);
        assert_eq!(stats["recent_items"][0]["product_name"], "Rice");
    }
}

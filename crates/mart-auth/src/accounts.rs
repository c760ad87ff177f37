//! Account persistence and the rules around it.

use crate::forms::{
    AdminUserForm, AdminUserUpdateForm, LoginForm, PasswordChangeForm, ProfileForm,
    RegistrationForm, UserQuery,
};
use crate::password::PasswordHasher;
use crate::user::{Account, Role};
use crate::AuthError;
use chrono::Utc;
use mart_commerce::UserId;
use mart_db::{params, Db};
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

/// Columns selected for [`Account`] rows.
const ACCOUNT_COLUMNS: &str = "id, username, email, role, address, contact, created_at";

#[derive(Deserialize)]
struct Credentials {
    #[serde(flatten)]
    account: Account,
    password_hash: String,
}

/// Column values for a new `users` row.
struct NewAccount<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
    address: &'a str,
    contact: &'a str,
}

/// Password behind the dummy hash checked for unknown emails.
const DUMMY_PASSWORD: &str = "freshmart-unknown-account";

/// Accounts backed by the `users` table.
#[derive(Clone)]
pub struct AccountStore {
    db: Db,
    hasher: PasswordHasher,
    /// Hash made with `hasher` so unknown-email logins cost one verify too.
    dummy_hash: Arc<OnceLock<String>>,
    allow_staff_self_registration: bool,
}

impl AccountStore {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            hasher: PasswordHasher::default(),
            dummy_hash: Arc::default(),
            allow_staff_self_registration: false,
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self.dummy_hash = Arc::default();
        self
    }

    /// Let public sign-up pick the admin or logistics role.
    pub fn allow_staff_self_registration(mut self, allow: bool) -> Self {
        self.allow_staff_self_registration = allow;
        self
    }

    /// Public sign-up.
    pub async fn register(&self, form: &RegistrationForm) -> Result<Account, AuthError> {
        let role = form.validate()?;
        if role != Role::User && !self.allow_staff_self_registration {
            tracing::warn!(role = %role, "self-registration with staff role rejected");
            return Err(AuthError::Forbidden);
        }
        let account = self
            .insert(NewAccount {
                username: form.username.trim(),
                email: form.email.trim(),
                password: &form.password,
                role,
                address: form.address.trim(),
                contact: form.contact.trim(),
            })
            .await?;
        tracing::info!(user_id = %account.id, role = %account.role, "user registered");
        Ok(account)
    }

    /// Check an email and password pair.
    pub async fn authenticate(&self, form: &LoginForm) -> Result<Account, AuthError> {
        form.validate()?;
        let sql = format!("SELECT {ACCOUNT_COLUMNS}, password_hash FROM users WHERE email = ?");
        let Some(credentials) = self
            .db
            .query_optional::<Credentials>(&sql, params![form.email.trim()])
            .await?
        else {
            self.verify_dummy(&form.password).await?;
            tracing::warn!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !self
            .verify_password(&form.password, &credentials.password_hash)
            .await?
        {
            tracing::warn!(user_id = %credentials.account.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(credentials.account)
    }

    pub async fn find(&self, id: UserId) -> Result<Option<Account>, AuthError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?");
        Ok(self.db.query_optional(&sql, params![id]).await?)
    }

    /// Fetch an account, failing with [`AuthError::UserNotFound`].
    pub async fn get(&self, id: UserId) -> Result<Account, AuthError> {
        self.find(id).await?.ok_or(AuthError::UserNotFound(id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = ?");
        Ok(self.db.query_optional(&sql, params![email.trim()]).await?)
    }

    /// Self-service profile edit.
    pub async fn update_profile(
        &self,
        id: UserId,
        form: &ProfileForm,
    ) -> Result<Account, AuthError> {
        form.validate()?;
        self.ensure_email_free(form.email.trim(), Some(id)).await?;
        let changed = self
            .db
            .execute(
                "UPDATE users SET username = ?, email = ?, contact = ?, address = ? WHERE id = ?",
                params![
                    form.username.trim(),
                    form.email.trim(),
                    form.contact.trim(),
                    form.address.trim(),
                    id
                ],
            )
            .await?;
        if changed == 0 {
            return Err(AuthError::UserNotFound(id));
        }
        self.get(id).await
    }

    /// Replace the password after checking the current one.
    pub async fn change_password(
        &self,
        id: UserId,
        form: &PasswordChangeForm,
    ) -> Result<(), AuthError> {
        form.validate()?;
        let current: Option<String> = self
            .db
            .query_optional::<PasswordRow>(
                "SELECT password_hash FROM users WHERE id = ?",
                params![id],
            )
            .await?
            .map(|row| row.password_hash);
        let current = current.ok_or(AuthError::UserNotFound(id))?;

        if !self.verify_password(&form.old_password, &current).await? {
            return Err(AuthError::WrongPassword);
        }
        if form.new_password == form.old_password {
            return Err(AuthError::NoOpChange);
        }

        let hash = self.hash_password(&form.new_password).await?;
        self.db
            .execute(
                "UPDATE users SET password_hash = ? WHERE id = ?",
                params![hash, id],
            )
            .await?;
        tracing::info!(user_id = %id, "password changed");
        Ok(())
    }

    /// Admin "add user". While no admin exists only an admin may be created.
    pub async fn admin_create(&self, form: &AdminUserForm) -> Result<Account, AuthError> {
        let role = form.validate()?;
        if role != Role::Admin && self.count_admins().await? == 0 {
            return Err(AuthError::LastAdminProtected);
        }
        let account = self
            .insert(NewAccount {
                username: form.username.trim(),
                email: form.email.trim(),
                password: &form.password,
                role,
                address: form.address.trim(),
                contact: form.contact.trim(),
            })
            .await?;
        tracing::info!(user_id = %account.id, role = %account.role, "user created by admin");
        Ok(account)
    }

    /// Admin "edit user". Demoting the only admin is refused.
    pub async fn admin_update(
        &self,
        id: UserId,
        form: &AdminUserUpdateForm,
    ) -> Result<Account, AuthError> {
        let role = form.validate()?;
        self.get(id).await?;
        self.ensure_email_free(form.email.trim(), Some(id)).await?;

        // The guard lives in the statement so the admin count and the write
        // see the same snapshot.
        let changed = self
            .db
            .execute(
                "UPDATE users SET username = ?, email = ?, role = ?, address = ?, contact = ? \
                 WHERE id = ? AND (role != 'admin' OR ? = 'admin' \
                 OR (SELECT COUNT(*) FROM users WHERE role = 'admin') > 1)",
                params![
                    form.username.trim(),
                    form.email.trim(),
                    role.as_str(),
                    form.address.trim(),
                    form.contact.trim(),
                    id,
                    role.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            tracing::warn!(user_id = %id, "refused to demote the last admin");
            return Err(AuthError::LastAdminProtected);
        }
        tracing::info!(user_id = %id, role = %role, "user updated by admin");
        self.get(id).await
    }

    /// Admin "delete user". Deleting the only admin is refused.
    ///
    /// The user's cart goes with the account; orders are kept.
    pub async fn admin_delete(&self, id: UserId) -> Result<(), AuthError> {
        let changed = self
            .db
            .execute(
                "DELETE FROM users WHERE id = ? AND (role != 'admin' \
                 OR (SELECT COUNT(*) FROM users WHERE role = 'admin') > 1)",
                params![id],
            )
            .await?;
        if changed == 0 {
            self.get(id).await?;
            tracing::warn!(user_id = %id, "refused to delete the last admin");
            return Err(AuthError::LastAdminProtected);
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Admin user listing.
    pub async fn list(&self, query: &UserQuery) -> Result<Vec<Account>, AuthError> {
        let (tail, params) = query.to_sql();
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users{tail}");
        Ok(self.db.query_as(&sql, &params).await?)
    }

    pub async fn count_admins(&self) -> Result<i64, AuthError> {
        Ok(self
            .db
            .query_i64("SELECT COUNT(*) FROM users WHERE role = 'admin'", params![])
            .await?)
    }

    pub async fn total_users(&self) -> Result<i64, AuthError> {
        Ok(self
            .db
            .query_i64("SELECT COUNT(*) FROM users", params![])
            .await?)
    }

    async fn ensure_email_free(
        &self,
        email: &str,
        except: Option<UserId>,
    ) -> Result<(), AuthError> {
        let except = except.map(UserId::get).unwrap_or(0);
        let taken = self
            .db
            .query_i64(
                "SELECT COUNT(*) FROM users WHERE email = ? AND id != ?",
                params![email, except],
            )
            .await?;
        if taken > 0 {
            return Err(AuthError::EmailExists);
        }
        Ok(())
    }

    async fn insert(&self, new: NewAccount<'_>) -> Result<Account, AuthError> {
        self.ensure_email_free(new.email, None).await?;
        let hash = self.hash_password(new.password).await?;
        // A racing sign-up still hits the UNIQUE index, which maps to EmailExists.
        let id = self
            .db
            .insert(
                "INSERT INTO users (username, email, password_hash, role, address, contact, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    new.username,
                    new.email,
                    hash,
                    new.role.as_str(),
                    new.address,
                    new.contact,
                    Utc::now().timestamp()
                ],
            )
            .await?;
        self.get(UserId::new(id)).await
    }

    /// Argon2 is CPU-bound; keep it off the async worker threads.
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher;
        let password = password.to_owned();
        run_blocking(move || hasher.hash(&password)).await
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        let (password, hash) = (password.to_owned(), hash.to_owned());
        run_blocking(move || hasher.verify(&password, &hash)).await
    }

    /// Spend a full verify on a login for an unknown email. The outcome is
    /// discarded; the dummy hash is built on first use.
    async fn verify_dummy(&self, password: &str) -> Result<(), AuthError> {
        let hasher = self.hasher;
        let dummy = Arc::clone(&self.dummy_hash);
        let password = password.to_owned();
        run_blocking(move || {
            let hash = match dummy.get() {
                Some(hash) => hash,
                None => {
                    let hash = hasher.hash(DUMMY_PASSWORD)?;
                    dummy.get_or_init(|| hash)
                }
            };
            hasher.verify(&password, hash).map(|_| ())
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
}

#[derive(Deserialize)]
struct PasswordRow {
    password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::UserSort;

    async fn store() -> AccountStore {
        let db = Db::open_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        AccountStore::new(db).with_hasher(PasswordHasher::new(256, 1, 1))
    }

    fn registration(email: &str, password: &str) -> RegistrationForm {
        RegistrationForm {
            username: "ana".into(),
            email: email.into(),
            password: password.into(),
            address: "1 Main St".into(),
            contact: "5550100".into(),
            role: "user".into(),
        }
    }

    async fn admin(store: &AccountStore, name: &str) -> Account {
        store
            .admin_create(&AdminUserForm {
                username: name.into(),
                email: format!("{name}@example.com"),
                password: "secret".into(),
                role: "admin".into(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let store = store().await;
        let account = store
            .register(&registration("ana@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(account.role, Role::User);

        let logged_in = store
            .authenticate(&login("ana@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, account.id);

        assert!(matches!(
            store.authenticate(&login("ana@example.com", "wrong!")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            store.authenticate(&login("nobody@example.com", "secret")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_unknown_email_runs_dummy_verify() {
        let store = store().await;
        assert!(store.dummy_hash.get().is_none());
        for _ in 0..2 {
            assert!(matches!(
                store.authenticate(&login("ghost@example.com", "secret")).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
        let dummy = store.dummy_hash.get().unwrap();
        assert!(dummy.starts_with("$argon2id$v=19$m=256,t=1,p=1$"));

        store
            .register(&registration("ana@example.com", "secret"))
            .await
            .unwrap();
        store
            .authenticate(&login("ana@example.com", "secret"))
            .await
            .unwrap();
        assert!(matches!(
            store.authenticate(&login("ana@example.com", DUMMY_PASSWORD)).await,
            Err(AuthError::InvalidCredentials)
        ));

        let rebuilt = store.clone().with_hasher(PasswordHasher::new(512, 1, 1));
        assert!(rebuilt.dummy_hash.get().is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email_and_weak_password() {
        let store = store().await;
        store
            .register(&registration("ana@example.com", "secret"))
            .await
            .unwrap();
        assert!(matches!(
            store.register(&registration("ana@example.com", "secret")).await,
            Err(AuthError::EmailExists)
        ));
        assert!(matches!(
            store.register(&registration("bo@example.com", "12345")).await,
            Err(AuthError::WeakPassword)
        ));
        assert_eq!(store.total_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_staff_self_registration_is_configurable() {
        let store = store().await;
        let mut form = registration("ops@example.com", "secret");
        form.role = "logistics".into();
        assert!(matches!(
            store.register(&form).await,
            Err(AuthError::Forbidden)
        ));

        let store = store.allow_staff_self_registration(true);
        assert_eq!(store.register(&form).await.unwrap().role, Role::Logistics);
    }

    #[tokio::test]
    async fn test_change_password() {
        let store = store().await;
        let id = store
            .register(&registration("ana@example.com", "secret"))
            .await
            .unwrap()
            .id;
        let form = |old: &str, new: &str| PasswordChangeForm {
            old_password: old.into(),
            new_password: new.into(),
            confirm_password: new.into(),
        };

        assert!(matches!(
            store.change_password(id, &form("wrong!", "better1")).await,
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            store.change_password(id, &form("secret", "secret")).await,
            Err(AuthError::NoOpChange)
        ));
        store
            .change_password(id, &form("secret", "better1"))
            .await
            .unwrap();
        assert!(store
            .authenticate(&login("ana@example.com", "better1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_email_must_be_free() {
        let store = store().await;
        let ana = store
            .register(&registration("ana@example.com", "secret"))
            .await
            .unwrap();
        store
            .register(&registration("bo@example.com", "secret"))
            .await
            .unwrap();

        let mut form = ProfileForm {
            username: "Ana B".into(),
            email: "bo@example.com".into(),
            contact: "5550199".into(),
            address: "2 High St".into(),
        };
        assert!(matches!(
            store.update_profile(ana.id, &form).await,
            Err(AuthError::EmailExists)
        ));

        // Keeping your own email is fine.
        form.email = "ana@example.com".into();
        let updated = store.update_profile(ana.id, &form).await.unwrap();
        assert_eq!(updated.username, "Ana B");
        assert_eq!(updated.address, "2 High St");
    }

    #[tokio::test]
    async fn test_first_account_created_by_admin_must_be_admin() {
        let store = store().await;
        let form = AdminUserForm {
            username: "bo".into(),
            email: "bo@example.com".into(),
            password: "secret".into(),
            role: "user".into(),
            ..Default::default()
        };
        assert!(matches!(
            store.admin_create(&form).await,
            Err(AuthError::LastAdminProtected)
        ));
        admin(&store, "root").await;
        assert_eq!(store.admin_create(&form).await.unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_deleted_or_demoted() {
        let store = store().await;
        let root = admin(&store, "root").await;
        let demote = AdminUserUpdateForm {
            username: "root".into(),
            email: "root@example.com".into(),
            role: "user".into(),
            ..Default::default()
        };

        assert!(matches!(
            store.admin_delete(root.id).await,
            Err(AuthError::LastAdminProtected)
        ));
        assert!(matches!(
            store.admin_update(root.id, &demote).await,
            Err(AuthError::LastAdminProtected)
        ));
        assert_eq!(store.get(root.id).await.unwrap().role, Role::Admin);

        // Editing the sole admin without changing the role is allowed.
        let keep = AdminUserUpdateForm {
            role: "admin".into(),
            address: "HQ".into(),
            ..demote.clone()
        };
        assert_eq!(
            store.admin_update(root.id, &keep).await.unwrap().address,
            "HQ"
        );

        let second = admin(&store, "deputy").await;
        assert_eq!(
            store.admin_update(root.id, &demote).await.unwrap().role,
            Role::User
        );
        assert!(matches!(
            store.admin_delete(second.id).await,
            Err(AuthError::LastAdminProtected)
        ));
        assert_eq!(store.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_with_two_admins_and_missing_user() {
        let store = store().await;
        let root = admin(&store, "root").await;
        admin(&store, "deputy").await;

        store.admin_delete(root.id).await.unwrap();
        assert!(store.find(root.id).await.unwrap().is_none());
        assert!(matches!(
            store.admin_delete(UserId::new(404)).await,
            Err(AuthError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = store().await;
        admin(&store, "root").await;
        store
            .register(&registration("ana@example.com", "secret"))
            .await
            .unwrap();
        let mut bo = registration("bo@shop.test", "secret");
        bo.username = "bo".into();
        store.register(&bo).await.unwrap();

        let all = store.list(&UserQuery::new()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].username, "bo");

        let hits = store
            .list(&UserQuery::new().with_search("example.com"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);

        let users = store
            .list(
                &UserQuery::new()
                    .with_role(Role::User)
                    .with_sort(UserSort::NameAsc),
            )
            .await
            .unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["ana", "bo"]);
    }

    #[tokio::test]
    async fn test_list_name_and_email_sort_ignore_case() {
        let store = store().await;
        for (username, email) in [("Banana", "Zed@shop.test"), ("apple", "amy@shop.test")] {
            let mut form = registration(email, "secret");
            form.username = username.into();
            store.register(&form).await.unwrap();
        }

        let users = store
            .list(&UserQuery::new().with_sort(UserSort::NameAsc))
            .await
            .unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["apple", "Banana"]);

        let users = store
            .list(&UserQuery::new().with_sort(UserSort::EmailAsc))
            .await
            .unwrap();
        let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["amy@shop.test", "Zed@shop.test"]);
    }
}

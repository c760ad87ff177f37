//! Shared setup for handler tests.

use crate::{AppConfig, Reply, Storefront};
use mart_auth::{Account, AdminUserForm, Flash, FlashLevel, Session};
use mart_commerce::catalog::{ProductDraft, ProductStore};
use mart_commerce::{Money, ProductId};
use mart_db::Db;

pub(crate) struct Harness {
    pub shop: Storefront,
    pub db: Db,
    pub admin: Account,
}

pub(crate) fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.accounts.hash_memory_kib = 256;
    config.accounts.hash_iterations = 1;
    config.accounts.hash_parallelism = 1;
    config
}

/// A migrated in-memory store with one admin, `root@example.com`.
pub(crate) async fn harness() -> Harness {
    harness_with(test_config()).await
}

pub(crate) async fn harness_with(config: AppConfig) -> Harness {
    let db = Db::open_in_memory().await.unwrap();
    db.migrate().await.unwrap();
    let shop = Storefront::new(db.clone(), &config);
    let admin = create_account(&shop, "root", "admin").await;
    Harness { shop, db, admin }
}

async fn create_account(shop: &Storefront, name: &str, role: &str) -> Account {
    shop.accounts()
        .admin_create(&AdminUserForm {
            username: name.into(),
            email: format!("{name}@example.com"),
            password: "secret".into(),
            role: role.into(),
            address: "1 Main St".into(),
            contact: "5550100".into(),
        })
        .await
        .unwrap()
}

impl Harness {
    pub async fn account(&self, name: &str, role: &str) -> Account {
        create_account(&self.shop, name, role).await
    }

    /// A logged-in session for a new account.
    pub async fn session(&self, name: &str, role: &str) -> (Session, Account) {
        let account = self.account(name, role).await;
        let mut session = Session::anonymous();
        session.login(&account);
        (session, account)
    }

    pub fn admin_session(&self) -> Session {
        let mut session = Session::anonymous();
        session.login(&self.admin);
        session
    }

    pub async fn product(&self, name: &str, cents: i64, stock: i64) -> ProductId {
        ProductStore::new(self.db.clone())
            .create(&ProductDraft::new(name, Money::new(cents), stock))
            .await
            .unwrap()
    }

    pub async fn stock(&self, id: ProductId) -> i64 {
        ProductStore::new(self.db.clone()).get(id).await.unwrap().stock
    }
}

/// Messages of one level, draining the session's flashes.
pub(crate) fn flashes(session: &mut Session, level: FlashLevel) -> Vec<String> {
    session
        .take_flashes()
        .into_iter()
        .filter(|f: &Flash| f.level == level)
        .map(|f| f.message)
        .collect()
}

pub(crate) fn assert_redirect(reply: &Reply, target: &str) {
    assert_eq!(reply.redirect_target(), Some(target), "{reply:?}");
}

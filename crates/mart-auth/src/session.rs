//! Per-request session state.
//!
//! A [`Session`] is owned by whoever serves requests and passed explicitly
//! to each handler. It carries the logged-in user, one-shot flash messages
//! and the form values to re-display after a failed submit.

use crate::user::{Account, Role, User};
use crate::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use mart_commerce::UserId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn generate() -> Self {
        let bytes: [u8; 24] = rand::thread_rng().gen();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user: User,
    flashes: Vec<Flash>,
    form_data: Option<BTreeMap<String, String>>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp when session expires.
    pub expires_at: i64,
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Session {
    /// Default session duration: 7 days.
    pub const DEFAULT_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

    /// Create a new session for an anonymous visitor.
    pub fn anonymous() -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: SessionId::generate(),
            user: User::Anonymous,
            flashes: Vec::new(),
            form_data: None,
            created_at: now,
            expires_at: now + Self::DEFAULT_DURATION_SECS,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.expires_at
    }

    /// Attach `account` and issue a fresh id.
    pub fn login(&mut self, account: &Account) {
        self.id = SessionId::generate();
        self.user = User::from(account);
        self.form_data = None;
        let now = Utc::now().timestamp();
        self.created_at = now;
        self.expires_at = now + Self::DEFAULT_DURATION_SECS;
    }

    /// Drop everything, keeping only a fresh anonymous session.
    pub fn logout(&mut self) {
        *self = Self::anonymous();
    }

    /// Mirror profile edits into the session.
    pub fn refresh_user(&mut self, account: &Account) {
        if self.user.user_id() == Some(account.id) {
            self.user = User::from(account);
        }
    }

    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.flashes.push(Flash {
            level: FlashLevel::Success,
            message: message.into(),
        });
    }

    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flashes.push(Flash {
            level: FlashLevel::Error,
            message: message.into(),
        });
    }

    /// Pending flashes, cleared on read.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    /// Remember submitted form values for the next render.
    pub fn keep_form(&mut self, data: BTreeMap<String, String>) {
        self.form_data = Some(data);
    }

    pub fn take_form(&mut self) -> Option<BTreeMap<String, String>> {
        self.form_data.take()
    }

    /// The logged-in user's id.
    pub fn require_user(&self) -> Result<UserId, AuthError> {
        self.user.user_id().ok_or(AuthError::Unauthenticated)
    }

    /// Require one of `roles`.
    pub fn require_role(&self, roles: &[Role]) -> Result<UserId, AuthError> {
        let id = self.require_user()?;
        match self.user.role() {
            Some(role) if roles.contains(&role) => Ok(id),
            _ => Err(AuthError::Forbidden),
        }
    }

    pub fn require_admin(&self) -> Result<UserId, AuthError> {
        self.require_role(&[Role::Admin])
    }

    /// Admin or logistics.
    pub fn require_staff(&self) -> Result<UserId, AuthError> {
        self.require_role(&[Role::Admin, Role::Logistics])
    }
}

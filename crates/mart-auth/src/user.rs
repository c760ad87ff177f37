//! User types.

use crate::AuthError;
use chrono::{DateTime, TimeZone, Utc};
use mart_commerce::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer.
    #[default]
    User,
    /// Store administrator.
    Admin,
    /// Staff that handles order fulfillment.
    Logistics,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Logistics];

    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Logistics => "logistics",
        }
    }

    /// Where a freshly logged-in user of this role lands.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::User => "/shopping",
            Role::Admin => "/inventory",
            Role::Logistics => "/admin/orders",
        }
    }

    /// Admin or logistics.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Logistics)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "logistics" => Ok(Role::Logistics),
            other => Err(AuthError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored account, without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub address: String,
    pub contact: String,
    /// Unix timestamp of registration.
    pub created_at: i64,
}

impl Account {
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.created_at, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The actor behind a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum User {
    /// Nobody is logged in.
    #[default]
    Anonymous,
    /// Logged-in user.
    Authenticated {
        id: UserId,
        username: String,
        email: String,
        role: Role,
    },
}

impl User {
    /// Check if user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, User::Authenticated { .. })
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, User::Anonymous)
    }

    /// Get user ID if authenticated.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            User::Authenticated { id, .. } => Some(*id),
            User::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            User::Authenticated { role, .. } => Some(*role),
            User::Anonymous => None,
        }
    }

    /// Get display name.
    pub fn display_name(&self) -> &str {
        match self {
            User::Authenticated { username, .. } => username,
            User::Anonymous => "Guest",
        }
    }

    /// Check if user has a specific role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }
}

impl From<&Account> for User {
    fn from(account: &Account) -> Self {
        User::Authenticated {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

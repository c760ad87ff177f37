//! Account forms and the admin user listing query.
//!
//! Every form deserializes with empty defaults and is validated once,
//! before any store call.

use crate::password::PasswordHasher;
use crate::user::Role;
use crate::AuthError;
use mart_commerce::form::{like_pattern, non_empty};
use mart_db::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn required(value: &str) -> Result<&str, AuthError> {
    non_empty(Some(value)).ok_or(AuthError::MissingFields)
}

/// Public sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub contact: String,
    pub role: String,
}

impl RegistrationForm {
    /// Check required fields and password strength, returning the requested role.
    pub fn validate(&self) -> Result<Role, AuthError> {
        for field in [
            &self.username,
            &self.email,
            &self.password,
            &self.address,
            &self.contact,
            &self.role,
        ] {
            required(field)?;
        }
        PasswordHasher::validate_password(&self.password)?;
        self.role.parse()
    }

    /// The submitted values minus the password, for re-display after a failure.
    pub fn to_form_data(&self) -> BTreeMap<String, String> {
        [
            ("username", &self.username),
            ("email", &self.email),
            ("address", &self.address),
            ("contact", &self.contact),
            ("role", &self.role),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        required(&self.email)?;
        required(&self.password)?;
        Ok(())
    }
}

/// Self-service profile edit. Every field is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub contact: String,
    pub address: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<(), AuthError> {
        for field in [&self.username, &self.email, &self.contact, &self.address] {
            required(field)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChangeForm {
    /// Checks that need no stored hash: presence, confirmation, strength.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.old_password.is_empty()
            || self.new_password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if self.new_password != self.confirm_password {
            return Err(AuthError::Mismatch);
        }
        PasswordHasher::validate_password(&self.new_password)
    }
}

/// Admin "add user" form. A blank role means `user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUserForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub address: String,
    pub contact: String,
}

impl AdminUserForm {
    pub fn validate(&self) -> Result<Role, AuthError> {
        required(&self.username)?;
        required(&self.email)?;
        required(&self.password)?;
        PasswordHasher::validate_password(&self.password)?;
        match non_empty(Some(self.role.as_str())) {
            Some(role) => role.parse(),
            None => Ok(Role::User),
        }
    }
}

/// Admin "edit user" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUserUpdateForm {
    pub username: String,
    pub email: String,
    pub role: String,
    pub address: String,
    pub contact: String,
}

impl AdminUserUpdateForm {
    pub fn validate(&self) -> Result<Role, AuthError> {
        required(&self.username)?;
        required(&self.email)?;
        required(&self.role)?.parse()
    }
}

/// Sort options for the admin user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserSort {
    IdAsc,
    #[default]
    IdDesc,
    NameAsc,
    NameDesc,
    EmailAsc,
    EmailDesc,
}

impl UserSort {
    /// Parse a sort key such as `name_asc`. Unknown keys fall back to the default.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "id_asc" => UserSort::IdAsc,
            "name_asc" => UserSort::NameAsc,
            "name_desc" => UserSort::NameDesc,
            "email_asc" => UserSort::EmailAsc,
            "email_desc" => UserSort::EmailDesc,
            _ => UserSort::IdDesc,
        }
    }

    /// Get SQL ORDER BY clause.
    pub fn to_sql(&self) -> &'static str {
        match self {
            UserSort::IdAsc => "id ASC",
            UserSort::IdDesc => "id DESC",
            UserSort::NameAsc => "username COLLATE NOCASE ASC, id ASC",
            UserSort::NameDesc => "username COLLATE NOCASE DESC, id DESC",
            UserSort::EmailAsc => "email COLLATE NOCASE ASC, id ASC",
            UserSort::EmailDesc => "email COLLATE NOCASE DESC, id DESC",
        }
    }
}

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserParams {
    pub search: Option<String>,
    pub role: Option<String>,
    pub sort: Option<String>,
}

/// Admin user listing query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    /// Substring matched against username or email.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub sort: UserSort,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_sort(mut self, sort: UserSort) -> Self {
        self.sort = sort;
        self
    }

    /// Build the WHERE and ORDER BY tail plus its parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(search) = &self.search {
            conditions.push("(username LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\')");
            let pattern = like_pattern(search);
            params.push(Value::Text(pattern.clone()));
            params.push(Value::Text(pattern));
        }
        if let Some(role) = self.role {
            conditions.push("role = ?");
            params.push(Value::from(role.as_str()));
        }

        let mut sql = String::new();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(self.sort.to_sql());
        (sql, params)
    }
}

impl From<UserParams> for UserQuery {
    fn from(params: UserParams) -> Self {
        let mut query = UserQuery::new();
        if let Some(search) = params.search {
            query = query.with_search(search);
        }
        query.role = params.role.as_deref().and_then(|r| r.parse().ok());
        query.sort = params
            .sort
            .as_deref()
            .map(UserSort::parse)
            .unwrap_or_default();
        query
    }
}

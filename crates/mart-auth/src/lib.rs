//! Authentication module for FreshMart.
//!
//! Provides accounts with the last-admin invariant, password hashing,
//! per-request sessions and role guards.

mod accounts;
mod error;
mod forms;
mod password;
mod session;
mod user;

pub use accounts::AccountStore;
pub use error::AuthError;
pub use forms::{
    AdminUserForm, AdminUserUpdateForm, LoginForm, PasswordChangeForm, ProfileForm,
    RegistrationForm, UserParams, UserQuery, UserSort,
};
pub use password::{PasswordHasher, MIN_PASSWORD_LEN};
pub use session::{Flash, FlashLevel, Session, SessionId};
pub use user::{Account, Role, User};

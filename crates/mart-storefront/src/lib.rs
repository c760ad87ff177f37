//! Request handlers for the FreshMart storefront.
//!
//! [`Storefront`] has one async method per route. Each takes the caller's
//! [`Session`](mart_auth::Session) and the route's typed input, and answers
//! with a [`Reply`]: a view to render, a redirect or a file download.
//!
//! Role guards run first. Validation and business-rule failures become a
//! flash message plus a redirect back to the form; only failures of the
//! store itself surface as [`StorefrontError`].
//!
//! # Example
//!
//! ```rust,ignore
//! let shop = Storefront::new(db, &AppConfig::default());
//! let mut session = Session::anonymous();
//!
//! shop.login(&mut session, LoginForm { email, password }).await?;
//! let reply = shop.add_to_cart(&mut session, product_id, QuantityForm::new("2")).await?;
//! assert_eq!(reply.redirect_target(), Some("/shopping"));
//! ```

/// Run a session check, answering with the guard's redirect on failure.
macro_rules! guard {
    ($session:expr, $check:ident) => {
        match $session.$check() {
            Ok(id) => id,
            Err(err) => return Ok($crate::app::deny($session, err)),
        }
    };
}

/// Unwrap a domain result, turning recoverable failures into a flash and a
/// redirect to `$back`.
macro_rules! recover {
    ($session:expr, $result:expr, $back:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => return $crate::app::recover($session, err, $back),
        }
    };
}

mod app;
pub mod config;
mod error;
mod handlers;
mod reply;

pub use app::Storefront;
pub use config::{AppConfig, ConfigError, LogFormat, LoggingConfig};
pub use error::{Result, StorefrontError};
pub use handlers::QuantityForm;
pub use reply::Reply;

//! Newtype IDs for type-safe identifiers.
//!
//! Every id is a SQLite rowid. Wrapping them prevents passing a
//! `ProductId` where an `OrderId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A row identifier.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw rowid.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw rowid.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<$name> for mart_db::Value {
            fn from(id: $name) -> Self {
                mart_db::Value::Integer(id.0)
            }
        }
    };
}

define_id!(ProductId);
define_id!(UserId);
define_id!(OrderId);

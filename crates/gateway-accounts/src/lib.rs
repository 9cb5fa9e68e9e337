//! # Gateway Accounts
//!
//! Account store for the relay gateway.
//!
//! Accounts live in a SQLite database reached through a sqlx pool. The store
//! is the only component that mutates account records; everything else reads
//! them through [`AccountStore`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use gateway_accounts::{AccountStore, SqlAccountStore};
//! use gateway_core::{CancellationToken, NewAccount};
//!
//! let store = SqlAccountStore::connect(&config.database).await?;
//! let token = CancellationToken::new();
//! let account = store
//!     .create(&NewAccount::new("alice", "p@ss").with_quota(100), 0, &token)
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod password;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod sqlite;

pub use password::{generate_aff_code, hash_password, verify_password, PasswordParams};
pub use pool::connect;
pub use repository::AccountStore;
pub use sqlite::SqlAccountStore;

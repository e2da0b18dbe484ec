//! SQLite backend for the NamedTogether client.
//!
//! Provides both external collaborators over a single file: [`SqliteStore`]
//! implements the document store and [`LocalIdentity`] the identity provider.
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod identity;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use identity::LocalIdentity;
pub use store::SqliteStore;

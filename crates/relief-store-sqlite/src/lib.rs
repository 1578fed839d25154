//! SQLite backend for the relief report store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each report kind is its own collection
//! table holding JSON documents, mirroring the document store the service was
//! designed around.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

//! SQLite backend for the COVID-19 statistics query service.
//!
//! Wraps a bounded pool of [`tokio_rusqlite`] connections so all database
//! access runs on dedicated threads without blocking the async runtime.

mod encode;
mod schema;
mod seed;
mod store;

pub mod error;
pub mod pool;

pub use error::{Error, Result};
pub use pool::{Pool, PoolOptions, Target};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

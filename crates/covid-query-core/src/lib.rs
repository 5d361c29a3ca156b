//! Core of the COVID-19 statistics query service.
//!
//! Turns a free-text question into one of a fixed family of parameterized
//! aggregate SQL templates and runs it through a cache and a
//! [`store::QueryStore`]. This crate is free of database and model
//! dependencies; backends and extractors implement its traits.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod bind;
pub mod cache;
pub mod error;
pub mod extract;
pub mod format;
pub mod gate;
pub mod intent;
pub mod pipeline;
pub mod plan;
pub mod select;
pub mod store;

pub use error::{QueryError, Result};
pub use pipeline::{Answer, Pipeline};

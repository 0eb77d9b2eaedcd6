//! Sized LRU - A byte-budgeted in-memory cache server
//!
//! The core is [`cache::SimpleLru`], a single-owner LRU cache whose capacity
//! is the total byte size of its keys and values. The API layer shares it
//! behind one lock and exposes it over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::{create_router, AppState};
pub use cache::SimpleLru;
pub use config::Config;

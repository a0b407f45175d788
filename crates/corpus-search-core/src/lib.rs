//! # Corpus Search Core
//!
//! Shared, I/O-free logic for corpus-search: data models, the text
//! normalizer, query expansion, snippet extraction, the store abstraction,
//! and the ranking algorithm.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Storage is reached
//! only through the [`store::Store`] trait; the application crate supplies
//! the SQLite implementation and [`store::memory::InMemoryStore`] serves
//! tests.

pub mod expand;
pub mod indexing;
pub mod models;
pub mod normalize;
pub mod search;
pub mod snippet;
pub mod store;

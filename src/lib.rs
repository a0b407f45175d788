//! # Corpus Search
//!
//! Keyword search over a local corpus of text documents, images and
//! videos, with bilingual (French/English) normalization.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────────┐
//! │  Files      │──▶│  Extract +   │──▶│    SQLite     │
//! │ txt/pdf/... │   │  Normalize   │   │ keyword_index │
//! └─────────────┘   └──────────────┘   └───────┬───────┘
//!                                              │
//!                                              ▼
//!                                        ┌──────────┐
//!                                        │   CLI    │
//!                                        │(csearch) │
//!                                        └──────────┘
//! ```
//!
//! The normalizer, query expansion, ranking and the [`Store`] trait live in
//! `corpus-search-core`. This crate supplies configuration, the SQLite
//! store, text extraction and the filesystem indexer.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite implementation of [`Store`] |
//! | [`extract`] | Text extraction (txt, pdf, docx, html) |
//! | [`indexer`] | File, media and folder indexing |
//! | [`search`] | Ranked search, suggestions, popular queries |
//! | [`get`] | Item retrieval with keywords |
//! | [`stats`] | Corpus counts |
//!
//! [`Store`]: corpus_search_core::store::Store

pub mod config;
pub mod db;
pub mod extract;
pub mod get;
pub mod indexer;
pub mod migrate;
pub mod search;
pub mod sqlite_store;
pub mod stats;

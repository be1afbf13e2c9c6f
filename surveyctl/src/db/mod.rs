//! Read access to the external credential store.
//!
//! The store is the survey platform's MySQL database. Each module has its own token
//! table (`<prefix><survey id>`, e.g. `lime_tokens_367996`) with at least `token` and
//! `email` columns. This crate never writes to it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Authenticator   │  (auth - comparison and caching)
//! └────────┬─────────┘
//!          │
//!          ↓
//! ┌──────────────────┐
//! │   Repositories   │  (db::handlers - queries)
//! └────────┬─────────┘
//!          │
//!          ↓
//! ┌──────────────────┐
//! │      Models      │  (db::models - rows)
//! └────────┬─────────┘
//!          │
//!          ↓
//! ┌──────────────────┐
//! │      MySQL       │
//! └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository for the token tables
//! - [`models`]: Row structures
//! - [`errors`]: Database-specific error types
//! - [`pools`]: Connection pool construction from configuration

pub mod errors;
pub mod handlers;
pub mod models;
pub mod pools;

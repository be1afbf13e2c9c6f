//! HTTP request handlers.
//!
//! - [`lookup`]: The lookup page, its form and the JSON API
//! - [`static_assets`]: Stylesheet and logo
//!
//! Handlers return [`crate::errors::Error`] on failure, which renders as a status code
//! and a message safe to show a respondent.

pub mod lookup;
pub mod static_assets;

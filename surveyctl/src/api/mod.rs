//! HTTP surface.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: JSON request/response bodies
//!
//! # Routes
//!
//! - `GET /`, `POST /`: the lookup page and its form submission
//! - `POST /api/v1/lookup`: the same lookup as JSON
//! - `GET /api/v1/modules`: module names, in display order
//! - `GET /static/{*path}`, `GET /branding/logo`: assets

pub mod handlers;
pub mod models;

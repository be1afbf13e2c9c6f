//! Repository implementations for database access.
//!
//! Repositories wrap a SQLx connection and return models from [`crate::db::models`].
//!
//! ```ignore
//! use surveyctl::db::handlers::Credentials;
//!
//! async fn example(pool: &sqlx::MySqlPool, table: &CredentialTable) -> anyhow::Result<()> {
//!     let mut conn = pool.acquire().await?;
//!     let records = Credentials::new(&mut conn).list(table).await?;
//!     println!("{} tokens", records.len());
//!     Ok(())
//! }
//! ```

pub mod credentials;

pub use credentials::Credentials;

//! Database repository for per-survey token tables.

use sqlx::MySqlConnection;
use tracing::instrument;

use crate::db::{
    errors::{DbError, Result},
    models::credentials::{CredentialRecord, CredentialTable},
};

pub struct Credentials<'c> {
    db: &'c mut MySqlConnection,
}

impl<'c> Credentials<'c> {
    pub fn new(db: &'c mut MySqlConnection) -> Self {
        Self { db }
    }

    /// The statement used to read every (token, email) pair of `table`
    pub fn list_query(table: &CredentialTable) -> String {
        format!("SELECT token, email FROM `{table}`")
    }

    /// Read every (token, email) pair of `table`
    #[instrument(skip(self, table), fields(table = %table), err)]
    pub async fn list(&mut self, table: &CredentialTable) -> Result<Vec<CredentialRecord>> {
        let query = Self::list_query(table);
        let records = sqlx::query_as::<_, CredentialRecord>(&query)
            .fetch_all(&mut *self.db)
            .await
            .map_err(|e| DbError::for_table(e, table.as_str()))?;

        tracing::debug!(count = records.len(), "fetched credential records");
        Ok(records)
    }
}

//! Token table providers.

use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::Credentials,
        models::credentials::{CredentialRecord, CredentialTable},
    },
    modules::SurveyModule,
};

/// Anything that can produce the (token, email) rows for a module.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Fetch every credential row for `module`. Called at most once per cache TTL per module.
    async fn fetch(&self, module: &SurveyModule) -> Result<Vec<CredentialRecord>>;
}

/// Reads `<table_prefix><survey id>` from the survey platform's MySQL database.
#[derive(Debug, Clone)]
pub struct MySqlCredentialSource {
    pool: MySqlPool,
    table_prefix: String,
}

impl MySqlCredentialSource {
    pub fn new(pool: MySqlPool, table_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            table_prefix: table_prefix.into(),
        }
    }

    pub fn table_for(&self, module: &SurveyModule) -> Result<CredentialTable> {
        CredentialTable::new(&self.table_prefix, module.survey_id).ok_or_else(|| {
            DbError::Other(anyhow::anyhow!(
                "credential table prefix '{}' is not a valid identifier",
                self.table_prefix
            ))
        })
    }
}

#[async_trait]
impl CredentialSource for MySqlCredentialSource {
    async fn fetch(&self, module: &SurveyModule) -> Result<Vec<CredentialRecord>> {
        let table = self.table_for(module)?;
        let mut conn = self.pool.acquire().await?;
        let mut repo = Credentials::new(&mut conn);
        repo.list(&table).await
    }
}

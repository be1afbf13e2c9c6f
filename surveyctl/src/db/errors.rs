use thiserror::Error;

/// MySQL error code for "table doesn't exist"
const ER_NO_SUCH_TABLE: &str = "1146";
/// SQLSTATE for an undefined table
const SQLSTATE_UNDEFINED_TABLE: &str = "42S02";

/// Unified error type for credential store operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// The credential table for a module does not exist in the store
    #[error("Table {table} does not exist")]
    UndefinedTable { table: String, message: String },

    /// Catch-all for non-recoverable errors (connectivity, pool exhaustion, protocol)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// Map a sqlx error raised while querying `table`, keeping the table name for logs
    pub fn for_table(err: sqlx::Error, table: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if is_undefined_table(db_err.code().as_deref()) => DbError::UndefinedTable {
                table: table.to_string(),
                message: db_err.message().to_string(),
            },
            _ => DbError::from(err),
        }
    }
}

fn is_undefined_table(code: Option<&str>) -> bool {
    matches!(code, Some(ER_NO_SUCH_TABLE) | Some(SQLSTATE_UNDEFINED_TABLE))
}

/// Anything other than a missing table is non-recoverable for a lookup
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Other(anyhow::Error::from(err))
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;

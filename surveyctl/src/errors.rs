use crate::db::errors::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data, e.g. a module that is not in the catalog
    #[error("{message}")]
    BadRequest { message: String },

    /// The module's dataset could not be read
    #[error("Failed to load dataset {path:?} for {module}")]
    DatasetUnavailable {
        module: String,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// No header of the module's dataset names an email column
    #[error("Dataset for {module} has no email column (no header contains \"correo\")")]
    MissingEmailColumn { module: String },

    /// Credential store query or connection error
    #[error(transparent)]
    CredentialStore(#[from] DbError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::DatasetUnavailable { .. } | Error::MissingEmailColumn { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::CredentialStore(_) => StatusCode::BAD_GATEWAY,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::DatasetUnavailable { .. } => "No fue posible cargar las respuestas de este módulo.".to_string(),
            Error::MissingEmailColumn { .. } => "No se encontró columna de correo en el CSV.".to_string(),
            Error::CredentialStore(_) => "No fue posible validar las credenciales en este momento.".to_string(),
            Error::Internal { .. } => "Error interno del servidor.".to_string(),
        }
    }

    /// Log the error with a severity matching who has to act on it
    pub fn log(&self) {
        match self {
            Error::Internal { .. } | Error::CredentialStore(DbError::Other(_)) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::CredentialStore(_) | Error::DatasetUnavailable { .. } | Error::MissingEmailColumn { .. } => {
                tracing::error!(error = ?self, "Data source error: {}", self);
            }
            Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

//! Database models for per-survey token tables.

use sqlx::FromRow;
use std::fmt;

use crate::types::{SurveyId, normalize_email, normalize_token};

/// Database entity model: one row of a token table. Either column may be NULL.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct CredentialRecord {
    pub token: Option<String>,
    pub email: Option<String>,
}

impl CredentialRecord {
    pub fn new(token: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            email: Some(email.into()),
        }
    }

    /// Normalize both columns for comparison. Rows missing either column can never match.
    pub fn normalized(&self) -> Option<NormalizedCredential> {
        Some(NormalizedCredential {
            email: normalize_email(self.email.as_deref()?),
            token: normalize_token(self.token.as_deref()?),
        })
    }
}

/// A credential pair in comparison form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedCredential {
    pub email: String,
    pub token: String,
}

/// Name of a module's token table, built from a validated prefix and a numeric id.
///
/// Only `[A-Za-z0-9_]` can appear in the name, so it is safe to splice into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialTable(String);

impl CredentialTable {
    pub fn new(prefix: &str, survey_id: SurveyId) -> Option<Self> {
        is_identifier(prefix).then(|| Self(format!("{prefix}{survey_id}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `s` only contains characters allowed in an unquoted table name prefix
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

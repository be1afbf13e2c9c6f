//! Credential checks against a module's token table.

use std::{sync::Arc, time::Duration};

use tracing::{debug, instrument};

use crate::{
    auth::source::CredentialSource,
    cache::MemoCache,
    db::models::credentials::NormalizedCredential,
    errors::{Error, Result},
    modules::SurveyModule,
    types::{SurveyId, normalize_email, normalize_token},
};

/// Token tables are re-read from the store at most this often unless configured otherwise.
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(60 * 60);

/// Decides whether an (email, token) pair is valid for a module.
#[derive(Clone)]
pub struct Authenticator {
    source: Arc<dyn CredentialSource>,
    cache: MemoCache<SurveyId, Arc<Vec<NormalizedCredential>>>,
}

impl Authenticator {
    pub fn new(source: Arc<dyn CredentialSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: MemoCache::with_ttl("credentials", ttl),
        }
    }

    /// The module's token table in comparison form, from cache while fresh.
    async fn credentials(&self, module: &SurveyModule) -> Result<Arc<Vec<NormalizedCredential>>> {
        self.cache
            .get_or_try_insert_with(module.survey_id, move || async move {
                let records = self.source.fetch(module).await?;
                let normalized: Vec<_> = records.iter().filter_map(|r| r.normalized()).collect();
                debug!(
                    rows = records.len(),
                    usable = normalized.len(),
                    "loaded credential table"
                );
                Ok::<_, Error>(Arc::new(normalized))
            })
            .await
    }

    /// True iff some row of the module's token table matches both the email and the token.
    ///
    /// Email is compared trimmed and lower-cased, the token trimmed but case-sensitive.
    /// Failing to reach the store is an error, not a denial.
    #[instrument(skip_all, fields(module = %module.name), err)]
    pub async fn authenticate(&self, module: &SurveyModule, email: &str, token: &str) -> Result<bool> {
        let credentials = self.credentials(module).await?;

        // NOTE: tokens are stored and compared in plain text, with no lockout or rate
        // limiting. Needs hardening before exposure beyond the intended respondents.
        let wanted = NormalizedCredential {
            email: normalize_email(email),
            token: normalize_token(token),
        };
        Ok(credentials.iter().any(|c| *c == wanted))
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("cached_modules", &self.cache.len())
            .field("ttl", &self.cache.ttl())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{errors::DbError, models::credentials::CredentialRecord};
    use crate::test_utils::StaticCredentials;

    fn module() -> SurveyModule {
        SurveyModule::new("Módulo 1", "M1 (367996).csv", 367996)
    }

    fn authenticator(source: &Arc<StaticCredentials>) -> Authenticator {
        Authenticator::new(source.clone(), DEFAULT_CREDENTIAL_TTL)
    }

    fn source() -> Arc<StaticCredentials> {
        Arc::new(StaticCredentials::new().with(367996, [CredentialRecord::new("abc123", "test@example.com")]))
    }

    #[tokio::test]
    async fn test_matching_pair_is_accepted() {
        let auth = authenticator(&source());
        assert!(auth.authenticate(&module(), "test@example.com", "abc123").await.unwrap());
    }

    #[tokio::test]
    async fn test_email_is_trimmed_and_case_insensitive() {
        let auth = authenticator(&source());
        assert!(auth.authenticate(&module(), "  TEST@Example.com ", " abc123\t").await.unwrap());
    }

    #[tokio::test]
    async fn test_token_is_case_sensitive() {
        let auth = authenticator(&source());
        assert!(!auth.authenticate(&module(), "test@example.com", "ABC123").await.unwrap());
    }

    #[tokio::test]
    async fn test_pair_must_match_on_the_same_row() {
        let source = Arc::new(StaticCredentials::new().with(
            367996,
            [
                CredentialRecord::new("abc123", "a@example.com"),
                CredentialRecord::new("xyz789", "b@example.com"),
            ],
        ));
        let auth = authenticator(&source);
        assert!(!auth.authenticate(&module(), "a@example.com", "xyz789").await.unwrap());
        assert!(auth.authenticate(&module(), "b@example.com", "xyz789").await.unwrap());
    }

    #[tokio::test]
    async fn test_rows_with_null_columns_never_match() {
        let source = Arc::new(StaticCredentials::new().with(
            367996,
            [CredentialRecord {
                token: None,
                email: Some("test@example.com".into()),
            }],
        ));
        let auth = authenticator(&source);
        assert!(!auth.authenticate(&module(), "test@example.com", "").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_table_is_a_store_error_not_a_denial() {
        let auth = authenticator(&Arc::new(StaticCredentials::new()));
        let err = auth.authenticate(&module(), "test@example.com", "abc123").await.unwrap_err();
        assert!(matches!(err, Error::CredentialStore(DbError::UndefinedTable { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_table_is_refetched_only_after_ttl() {
        let source = source();
        let auth = authenticator(&source);

        for _ in 0..3 {
            assert!(auth.authenticate(&module(), "test@example.com", "abc123").await.unwrap());
        }
        assert_eq!(source.fetches(), 1);

        tokio::time::advance(DEFAULT_CREDENTIAL_TTL - Duration::from_secs(1)).await;
        auth.authenticate(&module(), "test@example.com", "abc123").await.unwrap();
        assert_eq!(source.fetches(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        auth.authenticate(&module(), "test@example.com", "abc123").await.unwrap();
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried_on_next_call() {
        let source = Arc::new(StaticCredentials::new());
        let auth = authenticator(&source);

        assert!(auth.authenticate(&module(), "test@example.com", "abc123").await.is_err());
        assert!(auth.authenticate(&module(), "test@example.com", "abc123").await.is_err());
        assert_eq!(source.fetches(), 2);
    }
}

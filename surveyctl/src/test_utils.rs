//! Test utilities for integration testing (available with `test-utils` feature).

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::Router;

use crate::{
    AppState,
    answers::AnswerRetriever,
    auth::{Authenticator, CredentialSource},
    config::Config,
    datasets::DatasetStore,
    db::{
        errors::{DbError, Result},
        models::credentials::CredentialRecord,
    },
    lookup::LookupService,
    modules::{ModuleCatalog, SurveyModule},
    presenter::Presenter,
    templates::Templates,
    types::SurveyId,
};

/// In-memory token tables keyed by survey id. Counts every fetch.
///
/// A survey id without a table behaves like a store whose table does not exist.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    tables: HashMap<SurveyId, Vec<CredentialRecord>>,
    fetches: AtomicUsize,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, survey_id: u32, records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        self.tables.entry(SurveyId(survey_id)).or_default().extend(records);
        self
    }

    /// How many times a table has been requested
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn fetch(&self, module: &SurveyModule) -> Result<Vec<CredentialRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.tables
            .get(&module.survey_id)
            .cloned()
            .ok_or_else(|| DbError::UndefinedTable {
                table: format!("lime_tokens_{}", module.survey_id),
                message: "table does not exist".to_string(),
            })
    }
}

/// Write a survey export into `dir`.
pub fn write_dataset(dir: &Path, file_name: &str, contents: &str) {
    std::fs::write(dir.join(file_name), contents).expect("Failed to write test dataset");
}

/// Default configuration with exports read from `datasets_dir`.
pub fn create_test_config(datasets_dir: &Path) -> Config {
    let mut config = Config::default();
    config.datasets.dir = datasets_dir.to_path_buf();
    config.credential_store.url = Some("mysql://test@127.0.0.1:1/limesurvey".to_string());
    config
}

pub fn create_test_lookup_service(config: &Config, credentials: Arc<dyn CredentialSource>) -> LookupService {
    LookupService::new(
        ModuleCatalog::new(config.modules.clone()),
        Authenticator::new(credentials, config.credential_store.cache_ttl),
        AnswerRetriever::new(DatasetStore::new(&config.datasets.dir)),
        Presenter::new(&config.presentation),
    )
}

pub fn create_test_state(config: Config, credentials: Arc<dyn CredentialSource>) -> AppState {
    let lookup = create_test_lookup_service(&config, credentials);
    AppState::builder()
        .config(config)
        .lookup(lookup)
        .templates(Templates::load().expect("Failed to load templates"))
        .build()
}

/// Full router over in-memory credentials, without a database.
pub fn create_test_router(config: Config, credentials: Arc<dyn CredentialSource>) -> Router {
    let state = create_test_state(config, credentials);
    crate::build_router(&state).expect("Failed to build router")
}

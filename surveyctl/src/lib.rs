//! # surveyctl: self-service survey answer lookup
//!
//! `surveyctl` lets survey respondents review the answers they submitted, one module at a
//! time, without exposing anyone else's. A respondent picks a module, enters the email they
//! answered with and the access token the survey platform issued them, and gets back their
//! own responses rendered as expandable cards.
//!
//! ## Overview
//!
//! Two external sources are involved and neither is written to:
//!
//! - **Survey exports**: one CSV per module, exported from the survey platform. The column
//!   whose header contains "correo" identifies the respondent.
//! - **Credential store**: the survey platform's MySQL database, holding a token table per
//!   module (`lime_tokens_<survey id>`).
//!
//! ### Request Flow
//!
//! A submission passes through [`lookup::LookupService`]:
//!
//! 1. Incomplete input (module, email or token blank) is answered with a prompt
//! 2. The module name is resolved against the [`modules::ModuleCatalog`]
//! 3. [`auth::Authenticator`] checks the (email, token) pair against the module's token table
//! 4. [`answers::AnswerRetriever`] filters the module's export down to the respondent's rows
//! 5. [`presenter::Presenter`] drops administrative columns and builds one card per row
//!
//! Token tables are cached per module for `credential_store.cache_ttl`; exports are read
//! once per process. Both caches live in [`AppState`], not in statics.
//!
//! ## Configuration
//!
//! See [`config`] for the YAML layout and environment overrides.
//!
//! ## Testing
//!
//! Enable the `test-utils` feature for [`test_utils`], which provides an in-memory
//! credential source and router builders that need no database.

pub mod answers;
pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod datasets;
pub mod db;
pub mod errors;
pub mod lookup;
pub mod modules;
pub mod presenter;
pub mod static_assets;
pub mod telemetry;
pub mod templates;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

#[cfg(test)]
mod test;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::MySqlPool;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};

pub use config::Config;

use crate::{
    answers::AnswerRetriever,
    auth::{Authenticator, MySqlCredentialSource},
    datasets::DatasetStore,
    lookup::LookupService,
    modules::ModuleCatalog,
    presenter::Presenter,
    templates::Templates,
};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .lookup(lookup)
///     .templates(Templates::load()?)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub lookup: LookupService,
    pub templates: Templates,
}

/// Build the application router with every route and layer.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/lookup", post(api::handlers::lookup::lookup_json))
        .route("/modules", get(api::handlers::lookup::list_modules));

    let mut router = Router::new()
        .route(
            "/",
            get(api::handlers::lookup::lookup_page).post(api::handlers::lookup::submit_lookup),
        )
        .route("/static/{*path}", get(api::handlers::static_assets::serve_embedded_asset))
        .route("/branding/logo", get(api::handlers::static_assets::serve_logo))
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .with_state(state.clone());

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] builds the lazy credential store pool, the caches
///    and the router. No connection is opened and no export is read yet.
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, closes the pool and flushes telemetry
pub struct Application {
    router: Router,
    config: Config,
    pool: MySqlPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting survey lookup with configuration: {:#?}", config);

        let pool = db::pools::connect_lazy(&config.credential_store)?;
        let source = MySqlCredentialSource::new(pool.clone(), config.credential_store.table_prefix.clone());

        let lookup = LookupService::new(
            ModuleCatalog::new(config.modules.clone()),
            Authenticator::new(Arc::new(source), config.credential_store.cache_ttl),
            AnswerRetriever::new(DatasetStore::new(&config.datasets.dir)),
            Presenter::new(&config.presentation),
        );

        let app_state = AppState::builder()
            .config(config.clone())
            .lookup(lookup)
            .templates(Templates::load()?)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Survey lookup listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing credential store connections...");
        self.pool.close().await;

        // Shutdown telemetry
        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

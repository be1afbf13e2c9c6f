//! Connection pool for the credential store.

use std::{str::FromStr, time::Duration};

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use crate::config::{CredentialStoreConfig, PoolSettings};

/// Connection options from either the configured URL or the individual fields.
pub fn connect_options(config: &CredentialStoreConfig) -> Result<MySqlConnectOptions, sqlx::Error> {
    if let Some(url) = &config.url {
        return MySqlConnectOptions::from_str(url);
    }

    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user);
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

fn pool_options(settings: &PoolSettings) -> MySqlPoolOptions {
    let mut options = MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));

    // 0 means never
    if settings.idle_timeout_secs > 0 {
        options = options.idle_timeout(Duration::from_secs(settings.idle_timeout_secs));
    }
    if settings.max_lifetime_secs > 0 {
        options = options.max_lifetime(Duration::from_secs(settings.max_lifetime_secs));
    }
    options
}

/// Build the pool without opening a connection.
///
/// The store is only contacted when a respondent submits credentials, so the server
/// starts (and serves the form) even while the database is unreachable.
pub fn connect_lazy(config: &CredentialStoreConfig) -> Result<MySqlPool, sqlx::Error> {
    let options = connect_options(config)?;
    Ok(pool_options(&config.pool).connect_lazy_with(options))
}

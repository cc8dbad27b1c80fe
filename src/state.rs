use std::sync::Arc;

use crate::config::Config;
use crate::scoring::runner::TestRunner;
use crate::scoring::validator::ValidatorRegistry;
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub validators: Arc<ValidatorRegistry>,
    pub runner: Arc<dyn TestRunner>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<ValidatorRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.validators.clone()
    }
}

impl FromRef<AppState> for Arc<dyn TestRunner> {
    fn from_ref(state: &AppState) -> Self {
        state.runner.clone()
    }
}

impl AppState {
    /// Builds the state with the shipped exercise validators and the stub test runner.
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            pool,
            config,
            validators: Arc::new(ValidatorRegistry::with_defaults()),
            runner: Arc::new(crate::scoring::runner::StubRunner),
        }
    }
}

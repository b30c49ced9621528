use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::oracle::{PermissionOracle, SqliteOracle};
use crate::providers::{builtin, ProviderSettings};
use crate::render::Strings;
use crate::search::{SearchEngine, SearchError};
use crate::store::{CourseStore, SqliteCourseStore};

/// Shared application state / 共享应用状态
pub struct AppState {
    pub config: AppConfig,
    pub engine: Arc<SearchEngine>,
    pub store: Arc<dyn CourseStore>,
    pub permissions: Arc<dyn PermissionOracle>,
    pub strings: Strings,
    /// Cancelled on shutdown; every search runs under a child token / 关闭信号
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the store, oracles and built-in providers over one pool / 组装应用状态
    pub fn new(db: SqlitePool, config: AppConfig) -> Result<Self, SearchError> {
        let store: Arc<dyn CourseStore> = Arc::new(SqliteCourseStore::new(db.clone()));
        let oracle = Arc::new(SqliteOracle::new(db));

        let strings = Strings::new(&config.search);
        let provider_settings = ProviderSettings::new(&config.server.wwwroot, &config.search, &strings);
        let registry = builtin::build_registry(&config.search, &provider_settings, store.clone(), oracle.clone())?;
        tracing::info!("{} search categories registered", registry.len());

        let engine = SearchEngine::new(Arc::new(registry), oracle.clone(), config.search.clone());

        Ok(Self {
            config,
            engine: Arc::new(engine),
            store,
            permissions: oracle,
            strings,
            shutdown: CancellationToken::new(),
        })
    }
}

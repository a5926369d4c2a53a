use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::routes::Urls;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub urls: Urls,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let urls = Urls::new(&config.url_prefix, &config.static_url);
        Self {
            pool,
            config: Arc::new(config),
            urls,
        }
    }
}

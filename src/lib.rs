pub mod api;
pub mod config;
pub mod db;
pub mod enrich;

pub use db::DbPool;

use config::Config;
use std::time::Duration;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> anyhow::Result<Self> {
        // One client for all outbound fetches; the timeout bounds how long
        // an abandoned enrichment fetch can linger.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.enrichment.fetch_timeout_secs))
            .build()?;
        Ok(Self { config, db, http })
    }
}

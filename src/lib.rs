pub mod api;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod db;

pub use db::DbPool;

use config::Config;
use crypto::{TokenError, TokenKeys};

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Result<Self, TokenError> {
        let tokens = TokenKeys::new(&config.auth.secret, config.auth.token_ttl_secs)?;
        Ok(Self { config, db, tokens })
    }
}

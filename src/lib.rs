//! Trivia Core - question catalog service
//!
//! Category and question stores on SQLite, pagination, substring search and
//! quiz next-question selection, exposed over HTTP with actix-web.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod quiz;
pub mod request;
pub mod search;
pub mod seed;

use thiserror::Error;

pub use config::{Config, ConfigError};
pub use db::{Category, DbPool, NewQuestion, Question, QuestionFilter};
pub use error::{TriviaError, TriviaResult};
pub use handlers::{configure, AppState};
pub use pagination::{Page, QUESTIONS_PER_PAGE};
pub use seed::SeedError;

/// Connections kept open for the HTTP workers
pub const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open database pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Failed to initialise database: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to seed catalog: {0}")]
    Seed(#[from] SeedError),
}

/// Open the pool, create the schema, and seed empty tables from the configured files
pub fn prepare_database(config: &Config) -> Result<DbPool, StartupError> {
    let pool_size = config
        .workers
        .map(|w| (w as u32).max(DEFAULT_POOL_SIZE))
        .unwrap_or(DEFAULT_POOL_SIZE);
    let pool = db::open_pool(&config.database_path, pool_size)?;
    let conn = pool.get()?;
    db::init_schema(&conn)?;

    if let Some(ref path) = config.seed_categories {
        if db::list_categories(&conn)?.is_empty() {
            seed::load_categories(&conn, path)?;
        } else {
            log::debug!("Categories already present, skipping {}", path.display());
        }
    }

    if let Some(ref path) = config.seed_questions {
        if db::count_questions(&conn)? == 0 {
            seed::load_questions(&conn, path)?;
        } else {
            log::debug!("Questions already present, skipping {}", path.display());
        }
    }

    log::info!("Database ready at {}", config.database_path.display());
    Ok(pool)
}

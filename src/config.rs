//! Server configuration read from the environment (and `.env` when present)

use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    NotPositive { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub workers: Option<usize>,
    pub seed_categories: Option<PathBuf>,
    pub seed_questions: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("trivia.db"),
            bind_addr: "127.0.0.1:5000".to_string(),
            workers: None,
            seed_categories: None,
            seed_questions: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let workers = match get("TRIVIA_WORKERS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ConfigError::NotPositive {
                        name: "TRIVIA_WORKERS",
                        value,
                    })
                }
            },
            None => None,
        };

        Ok(Config {
            database_path: get("TRIVIA_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            bind_addr: get("TRIVIA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            workers,
            seed_categories: get("TRIVIA_SEED_CATEGORIES").map(PathBuf::from),
            seed_questions: get("TRIVIA_SEED_QUESTIONS").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TRIVIA_DATABASE_PATH", "/tmp/trivia_test.db"),
            ("TRIVIA_BIND_ADDR", "0.0.0.0:8080"),
            ("TRIVIA_WORKERS", "4"),
            ("TRIVIA_SEED_QUESTIONS", "data/questions.csv"),
            ("TRIVIA_SEED_CATEGORIES", ""),
        ])
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/trivia_test.db"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.seed_questions, Some(PathBuf::from("data/questions.csv")));
        assert_eq!(config.seed_categories, None);
    }

    #[test]
    fn test_bad_worker_count() {
        assert!(config_from(&[("TRIVIA_WORKERS", "0")]).is_err());
        assert!(config_from(&[("TRIVIA_WORKERS", "many")]).is_err());
    }
}

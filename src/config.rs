use crate::search::{RankOptions, DEFAULT_MAX_QUERY_CHARS, MAX_RESULTS};
use std::env;
use std::path::PathBuf;

/// Runtime settings, read from `MEDISAFE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub home: PathBuf,
    pub db_path: PathBuf,
    /// JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    pub rank: RankOptions,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let home = lookup("MEDISAFE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let db_path = lookup("MEDISAFE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".medisafe.db"));

        let catalog_path = lookup("MEDISAFE_CATALOG_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let max_results = lookup("MEDISAFE_MAX_RESULTS")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_RESULTS)
            .clamp(1, MAX_RESULTS);

        let max_query_chars = lookup("MEDISAFE_MAX_QUERY_CHARS")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_QUERY_CHARS);

        Self {
            home,
            db_path,
            catalog_path,
            rank: RankOptions {
                max_results,
                max_query_chars,
            },
        }
    }
}

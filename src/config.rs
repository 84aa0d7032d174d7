use std::env;
use std::path::{Path, PathBuf};

use crate::error::AppError;

const HOME_ENV: &str = "GOALTRACK_HOME";
const DB_ENV: &str = "GOALTRACK_DB";
const LOG_ENV: &str = "GOALTRACK_LOG";
const DATA_DIR_NAME: &str = ".goaltrack";
const DB_FILE_NAME: &str = "goaltrack.db";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Clone, Debug)]
pub struct Settings {
    pub db_path: PathBuf,
}

impl Settings {
    /// Flag beats `GOALTRACK_HOME`, which beats `$HOME/.goaltrack`.
    /// `GOALTRACK_DB` relocates only the database file.
    pub fn resolve(data_dir_flag: Option<PathBuf>) -> Result<Self, AppError> {
        let data_dir = match data_dir_flag {
            Some(dir) => dir,
            None => resolve_data_dir()?,
        };
        let db_path = non_empty_env(DB_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| resolve_db_path(&data_dir));
        Ok(Self { db_path })
    }
}

pub fn load_dotenv() {
    // A missing .env is the common case.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Warning: failed to load .env: {err}");
        }
    }
}

pub fn log_filter() -> String {
    non_empty_env(LOG_ENV)
        .or_else(|| non_empty_env("RUST_LOG"))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

pub fn resolve_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

fn resolve_data_dir() -> Result<PathBuf, AppError> {
    if let Some(dir) = non_empty_env(HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = non_empty_env("HOME").ok_or_else(|| {
        AppError::InvalidInput(format!(
            "cannot resolve data directory; set {HOME_ENV} or pass --data-dir"
        ))
    })?;
    Ok(PathBuf::from(home).join(DATA_DIR_NAME))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_environment() {
        let settings = Settings::resolve(Some(PathBuf::from("/tmp/goaltrack-flag")))
            .expect("resolve settings");
        if non_empty_env(DB_ENV).is_none() {
            assert_eq!(
                settings.db_path,
                PathBuf::from("/tmp/goaltrack-flag").join("goaltrack.db")
            );
        }
    }

    #[test]
    fn db_path_lives_in_data_dir() {
        let path = resolve_db_path(Path::new("/data"));
        assert_eq!(path, PathBuf::from("/data/goaltrack.db"));
    }
}

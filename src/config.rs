use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use crate::utils::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub cors_origins: Vec<String>,
    /// Hours between scheduled backups; 0 disables the scheduler.
    pub backup_interval_hours: u64,
    pub backup_retention: usize,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: try_load("PORT", "3002")?,
            data_dir: PathBuf::from(var_or("DATA_DIR", "./data")),
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "5242880")?,
            cache_ttl: Duration::from_secs(try_load("CACHE_TTL_SECONDS", "300")?),
            cache_max_entries: try_load("CACHE_MAX_ENTRIES", "500")?,
            cors_origins: parse_origins(&var_or("CORS_ORIGINS", "http://localhost:3000")),
            backup_interval_hours: try_load("BACKUP_INTERVAL_HOURS", "24")?,
            backup_retention: try_load("BACKUP_RETENTION", "7")?,
            seed_demo_data: try_load("SEED_DEMO_DATA", "false")?,
        })
    }

    /// Configuration rooted at `data_dir` with every other value at its default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3002,
            data_dir: data_dir.into(),
            max_upload_bytes: 5 * 1024 * 1024,
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 500,
            cors_origins: vec!["http://localhost:3000".to_string()],
            backup_interval_hours: 0,
            backup_retention: 7,
            seed_demo_data: false,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        log::debug!("{} not set, using default: {}", key, default);
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid {} value '{}': {}", key, raw, e)))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_cors_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000/, https://admin.college.edu ,,"),
            vec!["http://localhost:3000".to_string(), "https://admin.college.edu".to_string()]
        );
    }

    #[test]
    fn rejects_unparseable_numbers() {
        env::set_var("COLLEGE_TEST_BAD_PORT", "eighty");
        let result: Result<u16, _> = try_load("COLLEGE_TEST_BAD_PORT", "3002");
        assert!(matches!(result, Err(AppError::Config(_))));

        let fallback: u16 = try_load("COLLEGE_TEST_UNSET_PORT", "3002").unwrap();
        assert_eq!(fallback, 3002);
    }
}

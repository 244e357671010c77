use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;

/// Request bodies (uploads included) above this size are rejected.
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;
pub const SESSION_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);
pub const PAGE_SIZE: u64 = 10;

const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";
const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub secret_key: String,
    pub upload_folder: PathBuf,
    pub bind_addr: String,
}

impl AppConfig {
    /// Reads `DATABASE_URL`, `SECRET_KEY`, `UPLOAD_FOLDER` and `BIND_ADDR`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL is not set"))?;

        Ok(Self {
            database_url,
            secret_key: get("SECRET_KEY").unwrap_or_else(|| DEV_SECRET_KEY.to_string()),
            upload_folder: get("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_FOLDER)),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn database_url_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).expect_err("missing url should fail");
        assert_eq!(err.to_string(), "DATABASE_URL is not set");
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")]))
            .expect("config should load");

        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(config.uses_dev_secret());
        assert_eq!(config.upload_folder, PathBuf::from("uploads"));
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/thesis"),
            ("SECRET_KEY", "s3cret"),
            ("UPLOAD_FOLDER", "/srv/thesis/uploads"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .expect("config should load");

        assert!(!config.uses_dev_secret());
        assert_eq!(config.upload_folder, PathBuf::from("/srv/thesis/uploads"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }
}

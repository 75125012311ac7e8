//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! Loads and saves settings as TOML from the platform config path using the
//! [`directories`](https://docs.rs/directories) crate. A missing file is
//! replaced by the defaults, which are written out for the user to edit.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::{error::AppError, logging::LoggerConfig, model::view_state::ViewMode};

/// Where the bucket lives and what part of it the browser shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory backing the local bucket.
    pub bucket_root: PathBuf,

    /// Listing prefix inside the bucket.
    pub prefix: String,

    /// Validity of issued download URLs.
    #[serde(with = "humantime_serde")]
    pub url_ttl: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let bucket_root = ProjectDirs::from("org", "cloudfm", "cloudfm").map_or_else(
            || PathBuf::from("./bucket"),
            |dirs| dirs.data_dir().join("bucket"),
        );

        Self {
            bucket_root,
            prefix: "files/".to_string(),
            url_ttl: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Per-object fetches in flight during a refresh. 0 fans out to every
    /// enumerated object at once.
    pub max_concurrent_fetches: usize,

    /// chrono format for the modified column.
    pub date_format: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 0,
            date_format: "%-m/%-d/%Y".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// User signed in at startup, if any.
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub default_view: ViewMode,

    /// How long success and info notifications stay up.
    #[serde(with = "humantime_serde")]
    pub notification_ttl: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_view: ViewMode::Grid,
            notification_ttl: Duration::from_secs(3),
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub listing: ListingConfig,

    #[serde(default)]
    pub logging: LoggerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Loads config from the platform config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/cloudfm/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> Result<Self, AppError> {
        let path = Self::config_path()?;
        Self::load_from(&path).await
    }

    /// Loads config from an explicit path, writing defaults there if absent.
    pub async fn load_from(path: &Path) -> Result<Self, AppError> {
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(path)
                .await
                .map_err(|source| config_io(path, source))?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(path).await?;

            Ok(default_config)
        }
    }

    /// Saves config to TOML file at the platform config dir.
    pub async fn save(&self) -> Result<(), AppError> {
        let path = Self::config_path()?;
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), AppError> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|source| config_io(parent, source))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|source| config_io(path, source))?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "cloudfm", "cloudfm")
            .ok_or_else(|| AppError::Other("Could not determine config directory.".into()))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

fn config_io(path: &Path, source: std::io::Error) -> AppError {
    AppError::ConfigIo {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let cfg = Config::load_from(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(cfg.storage.prefix, "files/");
        assert_eq!(cfg.listing.max_concurrent_fetches, 0);
    }

    #[tokio::test]
    async fn partial_file_keeps_defaults_for_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        TokioFs::write(
            &path,
            "[storage]\nprefix = \"shared/\"\nurl_ttl = \"15m\"\n\n[ui]\ndefault_view = \"list\"\n",
        )
        .await
        .unwrap();

        let cfg = Config::load_from(&path).await.unwrap();

        assert_eq!(cfg.storage.prefix, "shared/");
        assert_eq!(cfg.storage.url_ttl, Duration::from_secs(900));
        assert_eq!(cfg.ui.default_view, ViewMode::List);
        assert_eq!(cfg.listing.date_format, "%-m/%-d/%Y");
        assert_eq!(cfg.ui.notification_ttl, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn save_then_load_keeps_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.auth.user = Some("ada".into());
        cfg.listing.max_concurrent_fetches = 8;

        cfg.save_to(&path).await.unwrap();
        let loaded = Config::load_from(&path).await.unwrap();

        assert_eq!(loaded.auth.user.as_deref(), Some("ada"));
        assert_eq!(loaded.listing.max_concurrent_fetches, 8);
    }

    #[tokio::test]
    async fn malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        TokioFs::write(&path, "[storage\nprefix = ").await.unwrap();

        let err = Config::load_from(&path).await.unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn unreadable_path_is_config_io_error() {
        let dir = TempDir::new().unwrap();

        // A directory exists but cannot be read as a file.
        let err = Config::load_from(dir.path()).await.unwrap_err();

        assert!(matches!(err, AppError::ConfigIo { ref path, .. } if path == dir.path()));
    }
}

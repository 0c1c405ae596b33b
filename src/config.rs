use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

/// Remote JSON document holding the published loop catalog.
pub const DEFAULT_CATALOG_URL: &str =
    "https://gist.githubusercontent.com/trillbill/d9e8a3c4ff5502053f11e6507970c64c/raw";

/// S3 origin that loop URLs in the catalog point at.
pub const DEFAULT_STORAGE_PREFIX: &str = "https://righter.s3.us-east-2.amazonaws.com/";

/// CloudFront distribution serving the same objects for download.
pub const DEFAULT_CDN_PREFIX: &str = "https://d23vnzhpxwsomk.cloudfront.net/";

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// URL of the remote loop catalog JSON document.
    pub catalog_url: String,
    /// Storage-domain prefix rewritten away for downloads.
    pub storage_prefix: String,
    /// Content-delivery prefix used for downloads and generated pack URLs.
    pub cdn_prefix: String,
    /// Directory downloaded loops are saved into (default: current directory).
    pub download_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            cdn_prefix: DEFAULT_CDN_PREFIX.to_string(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/righter/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

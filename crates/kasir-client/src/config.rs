//! # Client Configuration
//!
//! Where the backend lives, where the token is kept, and how big pages are.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KASIR_API_URL=http://10.0.0.5:8080                                 │
//! │     KASIR_TOKEN_PATH=/tmp/kasir.token                                  │
//! │     KASIR_POS_PAGE_SIZE / KASIR_ADMIN_PAGE_SIZE                        │
//! │     KASIR_RECEIPTS_DIR=/srv/kasir/nota                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/kasir/console.toml (Linux)                               │
//! │     ~/Library/Application Support/id.kasir.kasir/console.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8080, 12 products per POS page                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # console.toml
//! [api]
//! base_url = "http://localhost:8080"
//!
//! [auth]
//! token_path = "/home/kasir/.config/kasir/token"
//!
//! [pages]
//! pos_page_size = 12
//! admin_page_size = 10
//!
//! [receipts]
//! dir = "/home/kasir/nota"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

const CONFIG_FILE_NAME: &str = "console.toml";
const TOKEN_FILE_NAME: &str = "token";
const RECEIPTS_DIR_NAME: &str = "receipts";

// =============================================================================
// Sections
// =============================================================================

/// Backend location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
        }
    }
}

/// Token persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Token file. Defaults to `token` next to the config file.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

/// Page sizes for the paginated panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSettings {
    #[serde(default = "default_pos_page_size")]
    pub pos_page_size: u32,

    #[serde(default = "default_admin_page_size")]
    pub admin_page_size: u32,
}

fn default_pos_page_size() -> u32 {
    12
}

fn default_admin_page_size() -> u32 {
    10
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            pos_page_size: default_pos_page_size(),
            admin_page_size: default_admin_page_size(),
        }
    }
}

/// Where saved receipts go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSettings {
    /// Defaults to `receipts` under the platform data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub pages: PageSettings,

    #[serde(default)]
    pub receipts: ReceiptSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, or the platform default)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default file is not.
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading console config from file");
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(ClientError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.base_url()?;

        if self.pages.pos_page_size == 0 || self.pages.admin_page_size == 0 {
            return Err(ClientError::Config(
                "page sizes must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `KASIR_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("KASIR_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(path) = lookup("KASIR_TOKEN_PATH") {
            debug!(path = %path, "Overriding token path from environment");
            self.auth.token_path = Some(PathBuf::from(path));
        }

        if let Some(dir) = lookup("KASIR_RECEIPTS_DIR") {
            debug!(dir = %dir, "Overriding receipts dir from environment");
            self.receipts.dir = Some(PathBuf::from(dir));
        }

        if let Some(size) = lookup("KASIR_POS_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(n) => self.pages.pos_page_size = n,
                Err(_) => warn!(value = %size, "Ignoring invalid KASIR_POS_PAGE_SIZE"),
            }
        }

        if let Some(size) = lookup("KASIR_ADMIN_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(n) => self.pages.admin_page_size = n,
                Err(_) => warn!(value = %size, "Ignoring invalid KASIR_ADMIN_PAGE_SIZE"),
            }
        }
    }

    /// Parsed base URL, always ending in `/` so relative joins keep any path
    /// prefix (`http://host/api/` + `products`).
    pub fn base_url(&self) -> ClientResult<Url> {
        let mut raw = self.api.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let url = Url::parse(&raw)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::Config(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }
        Ok(url)
    }

    /// Token file location: configured path, else next to the config file.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.auth
            .token_path
            .clone()
            .or_else(|| Self::config_dir().map(|dir| dir.join(TOKEN_FILE_NAME)))
    }

    /// Receipt folder: configured, else the platform data dir, else
    /// `receipts` under the working directory.
    pub fn receipts_dir(&self) -> PathBuf {
        self.receipts.dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("id", "kasir", "kasir")
                .map(|dirs| dirs.data_dir().join(RECEIPTS_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(RECEIPTS_DIR_NAME))
        })
    }

    fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("id", "kasir", "kasir")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.pages.pos_page_size, 12);
        assert_eq!(config.pages.admin_page_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://kasir.example.com/api"

            [pages]
            pos_page_size = 24
            "#,
        )
        .unwrap();

        assert_eq!(config.pages.pos_page_size, 24);
        assert_eq!(config.pages.admin_page_size, 10);
        assert_eq!(
            config.base_url().unwrap().join("products").unwrap().as_str(),
            "https://kasir.example.com/api/products"
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(env(&[
            ("KASIR_API_URL", "http://10.0.0.5:9000"),
            ("KASIR_TOKEN_PATH", "/tmp/kasir.token"),
            ("KASIR_POS_PAGE_SIZE", "30"),
            ("KASIR_ADMIN_PAGE_SIZE", "many"),
            ("KASIR_RECEIPTS_DIR", "/srv/kasir/nota"),
        ]));

        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.token_path(), Some(PathBuf::from("/tmp/kasir.token")));
        assert_eq!(config.pages.pos_page_size, 30);
        assert_eq!(config.receipts_dir(), PathBuf::from("/srv/kasir/nota"));
        // Invalid numbers are ignored
        assert_eq!(config.pages.admin_page_size, 10);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://files.example.com".into();
        assert!(config.validate().unwrap_err().is_config_error());

        let mut config = ClientConfig::default();
        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.pages.admin_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        std::fs::write(&path, "[pages]\nadmin_page_size = 5\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.pages.admin_page_size, 5);

        let missing = dir.path().join("nope.toml");
        assert!(ClientConfig::load(Some(missing)).is_err());
    }
}

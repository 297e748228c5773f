//! Configuration file handling for gofinances.
//!
//! The configuration file is stored at `$GOFINANCES_HOME/config.json` and holds the Google OAuth
//! client, the display locale and, optionally, where the key-value storage file lives.

use crate::error::Res;
use crate::model::Locale;
use crate::store::FileStorage;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "gofinances";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORAGE_JSON: &str = "storage.json";
const REDIRECT_PORT: u16 = 3030;
const OAUTH_TIMEOUT_SECS: u64 = 300;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$GOFINANCES_HOME` and from there it loads `$GOFINANCES_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and an initial `config.json` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g.
    ///   `$HOME/gofinances`
    /// - `client_id` - The Google OAuth client id
    /// - `client_secret` - The Google OAuth client secret, needed by "Desktop app" clients
    /// - `locale` - How amounts, dates and labels are displayed
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if a config file already exists.
    pub async fn create(
        dir: impl Into<PathBuf>,
        client_id: &str,
        client_secret: Option<&str>,
        locale: Locale,
    ) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the gofinances home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if utils::exists(&config_path).await? {
            bail!("A config file already exists at '{}'", config_path.display())
        }

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            locale,
            google: GoogleClient {
                client_id: client_id.to_string(),
                client_secret: client_secret.map(str::to_string),
                redirect_port: REDIRECT_PORT,
                oauth_timeout_secs: OAUTH_TIMEOUT_SECS,
            },
            storage_path: None,
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `gofinances_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(gofinances_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = gofinances_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The gofinances home directory is missing, run 'gofinances init'")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'gofinances init'",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn locale(&self) -> Locale {
        self.config_file.locale
    }

    pub fn google(&self) -> &GoogleClient {
        &self.config_file.google
    }

    /// Returns the stored `storage_path` if it is absolute, otherwise resolves it against the
    /// home directory. Defaults to `$GOFINANCES_HOME/storage.json`.
    pub fn storage_path(&self) -> PathBuf {
        let p = self
            .config_file
            .storage_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(STORAGE_JSON));
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// The key-value storage described by this configuration.
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.storage_path())
    }
}

/// The Google OAuth client used for sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct GoogleClient {
    /// OAuth client id from the Google Cloud console
    client_id: String,

    /// OAuth client secret, required by Google for "Desktop app" clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,

    /// The localhost port that receives the OAuth redirect, 0 for any free port
    #[serde(default = "default_redirect_port")]
    redirect_port: u16,

    /// How long to wait for the user to finish signing in before giving up
    #[serde(default = "default_oauth_timeout_secs")]
    oauth_timeout_secs: u64,
}

fn default_redirect_port() -> u16 {
    REDIRECT_PORT
}

fn default_oauth_timeout_secs() -> u64 {
    OAUTH_TIMEOUT_SECS
}

impl GoogleClient {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn redirect_port(&self) -> u16 {
        self.redirect_port
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.oauth_timeout_secs)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "gofinances",
///   "config_version": 1,
///   "locale": "pt-BR",
///   "google": {
///     "client_id": "1234-abcd.apps.googleusercontent.com",
///     "client_secret": "GOCSPX-xxxx",
///     "redirect_port": 3030,
///     "oauth_timeout_secs": 300
///   },
///   "storage_path": "storage.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "gofinances"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// How amounts, dates and labels are displayed
    #[serde(default)]
    locale: Locale,

    /// The Google OAuth client
    google: GoogleClient,

    /// Path to the key-value storage file (optional, relative to the home directory or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path. The file holds the OAuth client secret, so
    /// only the current user may read it.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write_private(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("gofinances_home");

        let created = Config::create(&home, "my-client", Some("shh"), Locale::EnUs)
            .await
            .unwrap();
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.locale(), Locale::EnUs);
        assert_eq!(loaded.google().client_id(), "my-client");
        assert_eq!(loaded.google().client_secret(), Some("shh"));
        assert_eq!(loaded.google().redirect_port(), 3030);
        assert_eq!(loaded.google().timeout(), Duration::from_secs(300));
        assert_eq!(loaded.storage_path(), loaded.root().join("storage.json"));
    }

    #[tokio::test]
    async fn test_config_create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), "a", None, Locale::PtBr)
            .await
            .unwrap();
        assert!(Config::create(dir.path(), "b", None, Locale::PtBr)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "gofinances",
            "config_version": 1,
            "google": { "client_id": "abc" },
            "storage_path": "/var/lib/gofinances/kv.json"
        }"#;
        utils::write(dir.path().join(CONFIG_JSON), json).await.unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.locale(), Locale::PtBr);
        assert_eq!(config.google().client_secret(), None);
        assert_eq!(config.google().redirect_port(), REDIRECT_PORT);
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/var/lib/gofinances/kv.json")
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let json = r#"{
            "app_name": "other-app",
            "config_version": 1,
            "google": { "client_id": "abc" }
        }"#;
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, json).await.unwrap();

        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let config = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            locale: Locale::PtBr,
            google: GoogleClient {
                client_id: "x".to_string(),
                client_secret: None,
                redirect_port: 0,
                oauth_timeout_secs: 1,
            },
            storage_path: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("client_secret"));
        assert!(!json.contains("storage_path"));
        assert!(json.contains("\"locale\":\"pt-BR\""));
    }
}

//! Application configuration. Identity, paths, share links.

use serde::Deserialize;
use std::path::PathBuf;

/// Base of read-only share links when none is configured.
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000/share/";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding meetings.db. Read from MEETINGS_DATA_DIR (default ./data).
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Email of the acting user. Read from MEETINGS_USER_EMAIL.
    #[serde(default)]
    pub user_email: Option<String>,

    /// Display name stored on the user's profile. Read from MEETINGS_USER_NAME.
    #[serde(default)]
    pub user_name: Option<String>,

    /// Prefix for share links; the token is appended. Read from MEETINGS_SHARE_BASE_URL.
    #[serde(default)]
    pub share_base_url: Option<String>,

    /// Where uploaded audio is kept (default <data_dir>/audio). Read from MEETINGS_AUDIO_DIR.
    #[serde(default)]
    pub audio_dir: Option<String>,

    /// Where profile avatars are kept (default <data_dir>/avatars). Read from MEETINGS_AVATAR_DIR.
    #[serde(default)]
    pub avatar_dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("MEETINGS_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("MEETINGS"));
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    /// Defaults to `<data_dir>/audio`.
    pub fn audio_dir_or_default(&self) -> PathBuf {
        self.audio_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("audio"))
    }

    /// Defaults to `<data_dir>/avatars`.
    pub fn avatar_dir_or_default(&self) -> PathBuf {
        self.avatar_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("avatars"))
    }

    /// Always ends with `/` so a token can be appended directly.
    pub fn share_base_url_or_default(&self) -> String {
        let base = self
            .share_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string());
        if base.ends_with('/') {
            base
        } else {
            format!("{}/", base)
        }
    }

    /// Returns the configured user email, trimmed; `None` if unset or blank.
    pub fn user_email(&self) -> Option<String> {
        self.user_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

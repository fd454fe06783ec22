//! Persistent CLI configuration.
//!
//! Values come from the JSON config file and are overridden by `PAGESYNC_*`
//! environment variables. The access token is only ever read from the
//! environment.

use std::path::{Path, PathBuf};

use pagesync_core::auth::Credential;
use pagesync_core::config::{SyncSettings, DEFAULT_GRAPH_API_URL};
use pagesync_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "pagesync.db";

/// Whether the configured access token belongs to a user or to the page
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    User,
    #[default]
    Page,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub site_base_url: Option<String>,
    #[serde(default)]
    pub graph_api_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub token_kind: TokenKind,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagesync")
        .join(CONFIG_FILE_NAME)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagesync")
        .join(DB_FILE_NAME)
}

impl CliConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!("Failed to read config at {}: {}", path.display(), error))
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            CliError::Config(format!("Failed to parse config at {}: {}", path.display(), error))
        })?;
        config.normalize();
        Ok(config)
    }

    /// Apply `PAGESYNC_*` overrides read through `lookup`
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(page_id) = normalize_text_option(lookup("PAGESYNC_PAGE_ID")) {
            self.page_id = Some(page_id);
        }
        if let Some(url) = normalize_text_option(lookup("PAGESYNC_SITE_BASE_URL")) {
            self.site_base_url = Some(url);
        }
        if let Some(url) = normalize_text_option(lookup("PAGESYNC_GRAPH_API_URL")) {
            self.graph_api_url = Some(url);
        }
        if let Some(path) = normalize_text_option(lookup("PAGESYNC_DB_PATH")) {
            self.database_path = Some(PathBuf::from(path));
        }
        match normalize_text_option(lookup("PAGESYNC_TOKEN_KIND")).as_deref() {
            Some("user") => self.token_kind = TokenKind::User,
            Some("page") => self.token_kind = TokenKind::Page,
            Some(other) => tracing::warn!("Ignoring unknown PAGESYNC_TOKEN_KIND '{}'", other),
            None => {}
        }
        self
    }

    pub fn sync_settings(&self) -> Result<SyncSettings, CliError> {
        let page_id = normalize_text_option(self.page_id.clone())
            .ok_or_else(|| CliError::Config("page_id is not configured".to_string()))?;
        let site_base_url = normalize_text_option(self.site_base_url.clone())
            .ok_or_else(|| CliError::Config("site_base_url is not configured".to_string()))?;

        let mut settings = SyncSettings::new(page_id, site_base_url)?;
        settings.graph_api_url = normalize_text_option(self.graph_api_url.clone())
            .unwrap_or_else(|| DEFAULT_GRAPH_API_URL.to_string());
        if let Some(timeout) = self.request_timeout_secs {
            settings.request_timeout_secs = timeout;
        }
        Ok(settings.normalized()?)
    }

    /// Database path: command line, then config/env, then the platform default
    pub fn resolve_db_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(default_db_path)
    }

    fn normalize(&mut self) {
        self.page_id = normalize_text_option(self.page_id.clone());
        self.site_base_url = normalize_text_option(self.site_base_url.clone());
        self.graph_api_url = normalize_text_option(self.graph_api_url.clone());
    }
}

/// Access token from `PAGESYNC_ACCESS_TOKEN[_EXPIRES_AT]`
pub fn credential_from_env(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<Credential>, CliError> {
    let Some(token) = normalize_text_option(lookup("PAGESYNC_ACCESS_TOKEN")) else {
        return Ok(None);
    };

    let expires_at = normalize_text_option(lookup("PAGESYNC_ACCESS_TOKEN_EXPIRES_AT"))
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| {
                CliError::Config(format!(
                    "PAGESYNC_ACCESS_TOKEN_EXPIRES_AT must be unix seconds, got '{raw}'"
                ))
            })
        })
        .transpose()?;

    Ok(Some(Credential::new(token, expires_at)))
}

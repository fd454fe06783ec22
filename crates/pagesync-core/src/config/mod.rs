//! Sync settings.
//!
//! Provides the `SyncSettings` struct shared by the reconciler, the Graph API
//! client and the CLI. Values are normalized on load; secrets never live here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com/v19.0";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Target page and endpoints for a sync run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyncSettings {
    /// Identifier of the page entries are posted to
    pub page_id: String,
    /// Public base URL of the site; share images are resolved against it
    pub site_base_url: String,
    #[serde(default = "default_graph_api_url")]
    pub graph_api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_graph_api_url() -> String {
    DEFAULT_GRAPH_API_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl SyncSettings {
    /// Create settings with default Graph API endpoint and timeout
    pub fn new(page_id: impl Into<String>, site_base_url: impl Into<String>) -> Result<Self> {
        Self {
            page_id: page_id.into(),
            site_base_url: site_base_url.into(),
            graph_api_url: default_graph_api_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
        .normalized()
    }

    /// Parse settings from JSON and normalize them
    pub fn from_json(payload: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(payload)?;
        settings.normalized()
    }

    /// Trim values and reject missing or malformed ones
    pub fn normalized(self) -> Result<Self> {
        let page_id = normalize_required_value(self.page_id, "page_id")?;
        let site_base_url = normalize_required_http_url(self.site_base_url, "site_base_url")?;
        let graph_api_url = normalize_required_http_url(self.graph_api_url, "graph_api_url")?;
        if self.request_timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            page_id,
            site_base_url,
            graph_api_url,
            request_timeout_secs: self.request_timeout_secs,
        })
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Graph endpoint new posts are created on
    pub fn feed_endpoint(&self) -> String {
        format!("{}/feed", self.page_id)
    }
}

fn normalize_required_value(raw: String, field: &str) -> Result<String> {
    normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput(format!("setting '{field}' is required")))
}

fn normalize_required_http_url(raw: String, field: &str) -> Result<String> {
    let value = normalize_required_value(raw, field)?;
    if is_http_url(&value) {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(format!(
            "setting '{field}' must include http:// or https://"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let settings = SyncSettings::new(" 1234 ", "https://example.com/").unwrap();
        assert_eq!(settings.page_id, "1234");
        assert_eq!(settings.site_base_url, "https://example.com");
        assert_eq!(settings.graph_api_url, DEFAULT_GRAPH_API_URL);
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.feed_endpoint(), "1234/feed");
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let payload = r#"
        {
          "page_id": "1234",
          "site_base_url": "https://example.com",
          "unexpected": true
        }
        "#;
        let error = SyncSettings::from_json(payload).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn from_json_rejects_missing_page_id() {
        let payload = r#"{ "page_id": "  ", "site_base_url": "https://example.com" }"#;
        let error = SyncSettings::from_json(payload).unwrap_err();
        assert!(error.to_string().contains("page_id"));
    }

    #[test]
    fn from_json_rejects_non_http_urls() {
        let payload = r#"
        {
          "page_id": "1234",
          "site_base_url": "https://example.com",
          "graph_api_url": "graph.facebook.com"
        }
        "#;
        let error = SyncSettings::from_json(payload).unwrap_err();
        assert!(error.to_string().contains("http:// or https://"));
    }

    #[test]
    fn from_json_rejects_zero_timeout() {
        let payload = r#"
        {
          "page_id": "1234",
          "site_base_url": "https://example.com",
          "request_timeout_secs": 0
        }
        "#;
        assert!(SyncSettings::from_json(payload).is_err());
    }
}

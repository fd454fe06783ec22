//! Graph API client used to publish and edit page posts.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::Credential;
use crate::config::SyncSettings;
use crate::util::{compact_text, is_http_url, normalize_text_option};

/// Graph error code for "unsupported request / object does not exist"
const GRAPH_CODE_INVALID_PARAMETER: i64 = 100;
/// Graph error subcode for "object does not exist or lacks permission"
const GRAPH_SUBCODE_MISSING_OBJECT: i64 = 33;
/// Graph error code for "some of the aliases you requested do not exist"
const GRAPH_CODE_UNKNOWN_ALIAS: i64 = 803;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid Graph API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Graph API HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Graph API error: {message} (HTTP {status})")]
    Api {
        status: u16,
        code: Option<i64>,
        subcode: Option<i64>,
        message: String,
    },
    #[error("Invalid Graph API payload: {0}")]
    InvalidPayload(String),
}

impl GraphError {
    /// Whether the error says the targeted object is gone
    pub fn is_missing_object(&self) -> bool {
        match self {
            Self::Api {
                status, code, subcode, ..
            } => {
                *status == 404
                    || matches!(code, Some(GRAPH_CODE_UNKNOWN_ALIAS))
                    || matches!(
                        (code, subcode),
                        (
                            Some(GRAPH_CODE_INVALID_PARAMETER),
                            Some(GRAPH_SUBCODE_MISSING_OBJECT)
                        )
                    )
            }
            _ => false,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Decoded body of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    /// Identifier of a created object; edits answer without one
    pub id: Option<String>,
}

/// Write access to the remote page
#[async_trait]
pub trait RemoteApiClient: Send + Sync {
    /// POST form `params` to `endpoint` (relative to the API root)
    async fn post(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        credential: &Credential,
    ) -> GraphResult<RemoteResponse>;
}

#[derive(Clone)]
pub struct GraphApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl GraphApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GraphResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    pub fn from_settings(settings: &SyncSettings) -> GraphResult<Self> {
        Self::new(settings.graph_api_url.clone(), settings.request_timeout())
    }

    /// Exchange a user credential for the access token of `page_id`
    pub async fn page_access_token(
        &self,
        page_id: &str,
        credential: &Credential,
    ) -> GraphResult<Credential> {
        let response = self
            .client
            .get(self.url(page_id)?)
            .query(&[
                ("fields", "access_token"),
                ("access_token", credential.token()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status, &body));
        }

        let payload = response.json::<PageTokenResponse>().await?;
        let token = normalize_text_option(payload.access_token).ok_or_else(|| {
            GraphError::InvalidPayload(format!(
                "page {page_id} response did not include access_token"
            ))
        })?;

        // Page tokens derived from a user token share its lifetime
        Ok(Credential::new(token, credential.expires_at()))
    }

    fn url(&self, endpoint: &str) -> GraphResult<String> {
        let endpoint = endpoint.trim().trim_matches('/');
        if endpoint.is_empty() {
            return Err(GraphError::InvalidConfiguration(
                "endpoint must not be empty".to_string(),
            ));
        }
        Ok(format!("{}/{endpoint}", self.base_url))
    }
}

#[async_trait]
impl RemoteApiClient for GraphApiClient {
    async fn post(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, String>,
        credential: &Credential,
    ) -> GraphResult<RemoteResponse> {
        let mut form: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        form.push(("access_token", credential.token()));

        let response = self
            .client
            .post(self.url(endpoint)?)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(status, &body));
        }

        parse_post_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct PageTokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    id: Option<String>,
    success: Option<bool>,
}

fn parse_post_response(body: &str) -> GraphResult<RemoteResponse> {
    let payload: PostResponse = serde_json::from_str(body).map_err(|error| {
        GraphError::InvalidPayload(format!("{error}: {}", compact_text(body)))
    })?;

    match (normalize_text_option(payload.id), payload.success) {
        (Some(id), _) => Ok(RemoteResponse { id: Some(id) }),
        (None, Some(true)) => Ok(RemoteResponse { id: None }),
        (None, Some(false)) => Err(GraphError::InvalidPayload(
            "request was not applied (success: false)".to_string(),
        )),
        (None, None) => Err(GraphError::InvalidPayload(
            "response did not include id/success".to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: Option<GraphErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    message: Option<String>,
    code: Option<i64>,
    error_subcode: Option<i64>,
}

fn parse_api_error(status: StatusCode, body: &str) -> GraphError {
    if let Ok(GraphErrorBody {
        error: Some(detail),
    }) = serde_json::from_str::<GraphErrorBody>(body)
    {
        return GraphError::Api {
            status: status.as_u16(),
            code: detail.code,
            subcode: detail.error_subcode,
            message: normalize_text_option(detail.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        };
    }

    let trimmed = compact_text(body);
    GraphError::Api {
        status: status.as_u16(),
        code: None,
        subcode: None,
        message: if trimmed.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            trimmed
        },
    }
}

fn normalize_base_url(raw: String) -> GraphResult<String> {
    let base_url = normalize_text_option(Some(raw)).ok_or_else(|| {
        GraphError::InvalidConfiguration("base URL must not be empty".to_string())
    })?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(GraphError::InvalidConfiguration(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}

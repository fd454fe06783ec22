//! Access tokens for the Graph API.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::graph::{GraphApiClient, GraphError};
use crate::util::{normalize_text_option, unix_timestamp_now};

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Opaque access token with an optional expiry (Unix seconds)
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: Option<i64>,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: Option<i64>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub const fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    /// Tokens without an expiry never expire
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Page token exchange failed: {0}")]
    Exchange(#[from] GraphError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Source of credentials for the page
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid user credential, or `None` when there is none
    async fn load_valid_token(&self) -> AuthResult<Option<Credential>>;

    /// Scope a user credential down to the target page
    async fn exchange_page_token(&self, credential: &Credential) -> AuthResult<Credential>;
}

enum PageExchange {
    /// The configured credential already is a page token
    Passthrough,
    Graph {
        client: GraphApiClient,
        page_id: String,
    },
}

/// `TokenProvider` over a credential supplied by configuration
pub struct StaticTokenProvider {
    credential: Option<Credential>,
    exchange: PageExchange,
}

impl StaticTokenProvider {
    /// Provider for a user token, exchanged for the page token through `client`
    pub fn user_token(
        credential: Option<Credential>,
        client: GraphApiClient,
        page_id: impl Into<String>,
    ) -> AuthResult<Self> {
        let page_id = normalize_text_option(Some(page_id.into())).ok_or_else(|| {
            AuthError::InvalidConfiguration("page id must not be empty".to_string())
        })?;
        Ok(Self {
            credential: normalize_credential(credential),
            exchange: PageExchange::Graph { client, page_id },
        })
    }

    /// Provider for a token that is already scoped to the page
    pub fn page_token(credential: Option<Credential>) -> Self {
        Self {
            credential: normalize_credential(credential),
            exchange: PageExchange::Passthrough,
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn load_valid_token(&self) -> AuthResult<Option<Credential>> {
        match &self.credential {
            Some(credential) if credential.is_expired() => {
                tracing::warn!(
                    expires_at = credential.expires_at(),
                    "Configured access token has expired"
                );
                Ok(None)
            }
            Some(credential) => Ok(Some(credential.clone())),
            None => Ok(None),
        }
    }

    async fn exchange_page_token(&self, credential: &Credential) -> AuthResult<Credential> {
        match &self.exchange {
            PageExchange::Passthrough => Ok(credential.clone()),
            PageExchange::Graph { client, page_id } => {
                Ok(client.page_access_token(page_id, credential).await?)
            }
        }
    }
}

fn normalize_credential(credential: Option<Credential>) -> Option<Credential> {
    let credential = credential?;
    let token = normalize_text_option(Some(credential.token))?;
    Some(Credential::new(token, credential.expires_at))
}

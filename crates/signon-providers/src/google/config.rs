//! Google strategy settings and validation.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{StrategyError, StrategyResult};

/// Default OAuth scopes requested by the Google strategy.
///
/// Profile and email feed the identity resolution; the contacts feed scope
/// authorizes the friends pagination.
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.google.com/m8/feeds/",
];

/// The settings bundle as supplied by the caller, before validation.
///
/// Mirrors the construction-time mapping: `application_name` and
/// `redirect_url` are always required, and either an `id`/`secret` pair or
/// a `developer_key` must be present. `state` is the caller-generated
/// anti-forgery token, round-tripped verbatim through the consent page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    /// Application name shown on the consent page.
    pub application_name: Option<String>,
    /// The callback URL the provider redirects to after consent.
    pub redirect_url: Option<String>,
    /// OAuth client ID.
    pub id: Option<String>,
    /// OAuth client secret.
    pub secret: Option<String>,
    /// Server API key, the alternative credential form.
    pub developer_key: Option<String>,
    /// Anti-forgery state token.
    pub state: Option<String>,
}

impl RawSettings {
    /// Creates an empty settings bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the application name.
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Builder method to set the redirect URL.
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Builder method to set the OAuth client ID and secret.
    pub fn with_client(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self.secret = Some(secret.into());
        self
    }

    /// Builder method to set the developer key.
    pub fn with_developer_key(mut self, key: impl Into<String>) -> Self {
        self.developer_key = Some(key.into());
        self
    }

    /// Builder method to set the anti-forgery state token.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// The resolved credential form.
///
/// Exactly one variant survives validation; when both forms are supplied
/// the client ID/secret pair takes priority over the developer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAuth {
    /// Full OAuth client credentials, enabling code exchange.
    OAuthClient {
        /// The OAuth 2.0 client ID.
        id: String,
        /// The OAuth 2.0 client secret.
        secret: String,
    },
    /// A server API key; API calls carry it as the `key` query parameter
    /// but authorization-code exchange is unavailable.
    DeveloperKey(String),
}

/// Validated, immutable settings for the Google strategy.
///
/// Constructed once via [`GoogleSettings::resolve`] and owned exclusively
/// by one strategy instance.
#[derive(Debug, Clone)]
pub struct GoogleSettings {
    /// Application name shown on the consent page.
    pub application_name: String,
    /// The callback URL the provider redirects to after consent.
    pub redirect_url: String,
    /// The resolved credential form.
    pub auth: ClientAuth,
    /// Anti-forgery state token, appended verbatim to the authorize URL.
    pub state: Option<String>,
    /// OAuth scopes to request, space-joined into one URL parameter.
    pub scopes: Vec<String>,
    /// Per-request entry ceiling on the contacts feed (provider-side max).
    pub page_size: u32,
    /// Hard ceiling on pagination loops; exceeding it is an error rather
    /// than silent non-termination.
    pub max_pages: u32,
    /// Request timeout for the HTTP transport.
    pub timeout: Duration,
}

impl GoogleSettings {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default per-request entry ceiling for the contacts feed.
    pub const DEFAULT_PAGE_SIZE: u32 = 700;

    /// Default pagination ceiling.
    pub const DEFAULT_MAX_PAGES: u32 = 1000;

    /// Validates and normalizes a caller-supplied settings bundle.
    ///
    /// All of the following must hold, else this fails with a configuration
    /// error before any network activity:
    ///
    /// - `application_name` is present and non-empty
    /// - `redirect_url` is present and non-empty
    /// - `id` and `secret` are both present, or `developer_key` is present
    ///
    /// When both credential forms are supplied, the `id`/`secret` pair
    /// wins.
    pub fn resolve(raw: RawSettings) -> StrategyResult<Self> {
        let application_name = raw
            .application_name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StrategyError::configuration("application_name is required"))?;

        let redirect_url = raw
            .redirect_url
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StrategyError::configuration("redirect_url is required"))?;

        url::Url::parse(&redirect_url)
            .map_err(|e| StrategyError::configuration(format!("invalid redirect_url: {}", e)))?;

        let auth = match (raw.id, raw.secret, raw.developer_key) {
            (Some(id), Some(secret), _) if !id.is_empty() && !secret.is_empty() => {
                ClientAuth::OAuthClient { id, secret }
            }
            (_, _, Some(key)) if !key.is_empty() => ClientAuth::DeveloperKey(key),
            _ => {
                return Err(StrategyError::configuration(
                    "either an id/secret pair or a developer_key is required",
                ));
            }
        };

        Ok(Self {
            application_name,
            redirect_url,
            auth,
            state: raw.state,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            page_size: Self::DEFAULT_PAGE_SIZE,
            max_pages: Self::DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Sets the OAuth scopes to request.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the per-request entry ceiling on the contacts feed.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the pagination ceiling.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the OAuth client ID, when the full client form is in use.
    pub fn client_id(&self) -> Option<&str> {
        match &self.auth {
            ClientAuth::OAuthClient { id, .. } => Some(id),
            ClientAuth::DeveloperKey(_) => None,
        }
    }
}

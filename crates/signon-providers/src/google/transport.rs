//! HTTP transport to Google's identity and feed endpoints.
//!
//! [`GoogleTransport`] is the interface boundary to the provider: token
//! exchange, profile fetch, identity-token verification, and authenticated
//! feed-page requests. The strategy is written against the trait so tests
//! can substitute an in-memory implementation; [`HttpTransport`] is the
//! reqwest-backed production one.

use tracing::{debug, info};

use crate::error::{StrategyError, StrategyResult};
use crate::strategy::BoxFuture;

use super::config::{ClientAuth, GoogleSettings};
use super::contacts::FeedPage;
use super::tokens::{AccessCredential, AuthClaims, TokenResponse};

/// Google's token endpoint.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google's remote identity-token verification endpoint.
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Google's profile endpoint for the authenticated subject.
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// The provider's profile representation for the authenticated subject.
///
/// Unverified data; identity attributes come from the verified claims, the
/// profile only contributes name fields.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Profile {
    /// Given name, absent on some accounts.
    #[serde(default)]
    pub given_name: Option<String>,
    /// Family name, absent on some accounts.
    #[serde(default)]
    pub family_name: Option<String>,
}

/// The identity provider's interface boundary.
///
/// One method per external round-trip the strategy performs. Network,
/// timeout, and HTTP-level failures surface from here unchanged; the
/// strategy neither catches nor retries them.
pub trait GoogleTransport: Send + Sync {
    /// Exchanges an authorization code for an access credential.
    fn exchange_code(&self, code: &str) -> BoxFuture<'_, StrategyResult<AccessCredential>>;

    /// Fetches the profile of the subject behind the credential ("me").
    fn fetch_profile(
        &self,
        credential: &AccessCredential,
    ) -> BoxFuture<'_, StrategyResult<Profile>>;

    /// Verifies an identity token and returns its claims.
    ///
    /// A syntactically well-formed but unverifiable token is an error; the
    /// claims of an unverified token are never returned.
    fn verify_id_token(&self, id_token: &str) -> BoxFuture<'_, StrategyResult<AuthClaims>>;

    /// Performs an authenticated request against a feed URL and parses the
    /// returned page.
    fn fetch_feed_page(
        &self,
        url: &str,
        credential: &AccessCredential,
    ) -> BoxFuture<'_, StrategyResult<FeedPage>>;
}

/// Production transport backed by reqwest.
#[derive(Debug)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    auth: ClientAuth,
    redirect_url: String,
}

impl HttpTransport {
    /// Creates a transport from validated settings.
    pub fn new(settings: &GoogleSettings) -> StrategyResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                StrategyError::internal(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            auth: settings.auth.clone(),
            redirect_url: settings.redirect_url.clone(),
        })
    }

    /// Maps a reqwest send error to a strategy error.
    fn map_send_error(e: reqwest::Error) -> StrategyError {
        if e.is_timeout() {
            StrategyError::network("request timeout")
        } else if e.is_connect() {
            StrategyError::network(format!("connection failed: {}", e))
        } else {
            StrategyError::network(format!("request failed: {}", e))
        }
    }

    /// Maps a non-success status to a strategy error, consuming the body.
    async fn fail_for_status(response: reqwest::Response) -> StrategyError {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return StrategyError::authentication("access token expired or invalid");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return StrategyError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            ));
        }

        let body = response.text().await.unwrap_or_default();
        StrategyError::server(format!("API error ({}): {}", status, body))
    }

    /// Attaches the developer key as a query parameter when that credential
    /// form is in use.
    fn with_api_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            ClientAuth::DeveloperKey(key) => request.query(&[("key", key.as_str())]),
            ClientAuth::OAuthClient { .. } => request,
        }
    }
}

impl GoogleTransport for HttpTransport {
    fn exchange_code(&self, code: &str) -> BoxFuture<'_, StrategyResult<AccessCredential>> {
        let code = code.to_string();
        Box::pin(async move {
            let (id, secret) = match &self.auth {
                ClientAuth::OAuthClient { id, secret } => (id.as_str(), secret.as_str()),
                ClientAuth::DeveloperKey(_) => {
                    return Err(StrategyError::authentication(
                        "code exchange requires an OAuth client id and secret",
                    ));
                }
            };

            let params = [
                ("client_id", id),
                ("client_secret", secret),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_url.as_str()),
            ];

            let response = self
                .http_client
                .post(GOOGLE_TOKEN_URL)
                .form(&params)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| StrategyError::network(format!("failed to read response: {}", e)))?;

            if !status.is_success() {
                return Err(StrategyError::authentication(format!(
                    "token exchange failed ({}): {}",
                    status, body
                )));
            }

            let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
                StrategyError::invalid_response(format!("invalid token response: {}", e))
            })?;

            info!("exchanged authorization code for access credential");
            Ok(AccessCredential::from_response(&body, token_response))
        })
    }

    fn fetch_profile(
        &self,
        credential: &AccessCredential,
    ) -> BoxFuture<'_, StrategyResult<Profile>> {
        let access_token = credential.access_token.clone();
        Box::pin(async move {
            let request = self
                .http_client
                .get(GOOGLE_USERINFO_URL)
                .bearer_auth(&access_token);

            let response = self
                .with_api_key(request)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::fail_for_status(response).await);
            }

            let body = response
                .text()
                .await
                .map_err(|e| StrategyError::network(format!("failed to read response: {}", e)))?;

            serde_json::from_str(&body).map_err(|e| {
                StrategyError::invalid_response(format!("failed to parse profile: {}", e))
            })
        })
    }

    fn verify_id_token(&self, id_token: &str) -> BoxFuture<'_, StrategyResult<AuthClaims>> {
        let id_token = id_token.to_string();
        Box::pin(async move {
            let response = self
                .http_client
                .get(GOOGLE_TOKENINFO_URL)
                .query(&[("id_token", id_token.as_str())])
                .send()
                .await
                .map_err(Self::map_send_error)?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| StrategyError::network(format!("failed to read response: {}", e)))?;

            // tokeninfo answers 4xx for any token it cannot verify; a
            // well-formed but unverifiable token must fail here rather
            // than fall back to unverified data.
            if !status.is_success() {
                return Err(StrategyError::authentication(format!(
                    "identity token verification failed ({}): {}",
                    status, body
                )));
            }

            serde_json::from_str(&body).map_err(|e| {
                StrategyError::invalid_response(format!("failed to parse claims: {}", e))
            })
        })
    }

    fn fetch_feed_page(
        &self,
        url: &str,
        credential: &AccessCredential,
    ) -> BoxFuture<'_, StrategyResult<FeedPage>> {
        let url = url.to_string();
        let access_token = credential.access_token.clone();
        Box::pin(async move {
            debug!("fetching feed page: {}", url);

            let request = self.http_client.get(&url).bearer_auth(&access_token);

            let response = self
                .with_api_key(request)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::fail_for_status(response).await);
            }

            let body = response
                .text()
                .await
                .map_err(|e| StrategyError::network(format!("failed to read response: {}", e)))?;

            FeedPage::parse(&body)
        })
    }
}

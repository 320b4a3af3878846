//! Authorization URL construction and credential resolution.
//!
//! Two steps of the authorization-code flow live here: building the
//! consent-page URL the user is redirected to, and resolving the callback
//! parameters into an access credential. The credential is returned as a
//! value and consumed by the same logical operation; it is never stored on
//! the strategy instance.

use tracing::debug;

use signon_core::AuthParams;

use crate::error::{StrategyError, StrategyResult};

use super::config::GoogleSettings;
use super::tokens::AccessCredential;
use super::transport::GoogleTransport;

/// Google's OAuth 2.0 authorization endpoint.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Builds the consent-page URL for the configured scopes.
///
/// The scope list is space-joined and URL-encoded as one parameter. When an
/// anti-forgery `state` was configured it is appended as an additional
/// query parameter; its decoded value round-trips to the callback
/// byte-for-byte so the caller can verify it against the one it generated.
///
/// # Errors
///
/// Fails with a configuration error when the settings carry only a
/// developer key; the consent page requires an OAuth client id.
pub fn build_auth_url(settings: &GoogleSettings) -> StrategyResult<String> {
    let client_id = settings.client_id().ok_or_else(|| {
        StrategyError::configuration("login requires an OAuth client id, not a developer key")
    })?;

    let scope = settings.scopes.join(" ");

    let mut url = format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
        GOOGLE_AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(&settings.redirect_url),
        urlencoding::encode(&scope),
    );

    if let Some(ref state) = settings.state {
        url.push_str("&state=");
        url.push_str(&urlencoding::encode(state));
    }

    Ok(url)
}

/// Resolves the supplied parameters into an access credential.
///
/// Resolution order: a present access token is trusted directly (no
/// network; repeated calls return an equivalent credential); otherwise a
/// present authorization code is exchanged at the token endpoint; with
/// neither, resolution fails.
pub async fn resolve_credential<T>(
    transport: &T,
    params: &AuthParams,
) -> StrategyResult<AccessCredential>
where
    T: GoogleTransport + ?Sized,
{
    if let Some(ref token) = params.access_token {
        debug!("using caller-supplied access token");
        return Ok(AccessCredential::from_caller_token(token));
    }

    if let Some(ref code) = params.code {
        debug!("exchanging authorization code");
        return transport.exchange_code(code).await;
    }

    Err(StrategyError::authentication(
        "no access token or authorization code supplied",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::config::RawSettings;

    fn settings() -> GoogleSettings {
        GoogleSettings::resolve(
            RawSettings::new()
                .with_application_name("soapbox")
                .with_redirect_url("https://app.example.com/callback")
                .with_client("client-id", "client-secret"),
        )
        .unwrap()
    }

    #[test]
    fn auth_url_format() {
        let url = build_auth_url(&settings()).unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains(&format!(
            "redirect_uri={}",
            urlencoding::encode("https://app.example.com/callback")
        )));
        assert!(!url.contains("state="));
    }

    #[test]
    fn auth_url_joins_scopes_with_encoded_spaces() {
        let settings = settings().with_scopes(vec![
            "https://www.googleapis.com/auth/userinfo.profile".into(),
            "https://www.googleapis.com/auth/userinfo.email".into(),
        ]);
        let url = build_auth_url(&settings).unwrap();

        let expected = urlencoding::encode(
            "https://www.googleapis.com/auth/userinfo.profile \
             https://www.googleapis.com/auth/userinfo.email",
        )
        .into_owned();
        assert!(url.contains(&format!("scope={}", expected)));
        // Each scope appears exactly once.
        assert_eq!(url.matches("userinfo.profile").count(), 1);
        assert_eq!(url.matches("userinfo.email").count(), 1);
    }

    #[test]
    fn auth_url_state_round_trips() {
        let raw_state = "csrf token/with?reserved=chars&more";
        let settings = GoogleSettings::resolve(
            RawSettings::new()
                .with_application_name("soapbox")
                .with_redirect_url("https://app.example.com/callback")
                .with_client("client-id", "client-secret")
                .with_state(raw_state),
        )
        .unwrap();

        let url = build_auth_url(&settings).unwrap();
        let encoded = url.split("state=").nth(1).unwrap();
        let decoded = urlencoding::decode(encoded).unwrap();
        assert_eq!(decoded, raw_state);
    }

    #[test]
    fn auth_url_rejects_developer_key_form() {
        let settings = GoogleSettings::resolve(
            RawSettings::new()
                .with_application_name("soapbox")
                .with_redirect_url("https://app.example.com/callback")
                .with_developer_key("server-key"),
        )
        .unwrap();

        let err = build_auth_url(&settings).unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::StrategyErrorCode::ConfigurationError
        );
    }
}

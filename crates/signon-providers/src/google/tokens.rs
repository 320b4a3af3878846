//! Access credential and identity-token claim types.
//!
//! Google's SDKs serialize a token grant as one JSON blob bundling the
//! access token with the identity token. A caller resuming a session hands
//! that blob back as its `access_token` parameter, so credential parsing
//! accepts both the blob and a bare opaque token string.

use serde::Deserialize;

/// Provider-issued token material for one call chain.
///
/// Created by code exchange or parsed from a caller-supplied token; held
/// only for the duration of the current request and never persisted. The
/// identity token, when present, is the only source of verified identity
/// claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCredential {
    /// The raw token string as received from the caller or the token
    /// endpoint, echoed back on the resolved [`User`].
    ///
    /// [`User`]: signon_core::User
    pub raw: String,
    /// The bearer token authorizing API calls.
    pub access_token: String,
    /// The signed identity token carried alongside the grant, if any.
    pub id_token: Option<String>,
}

impl AccessCredential {
    /// Parses a caller-supplied access token.
    ///
    /// Accepts either the SDK-style JSON blob (`{"access_token": ...,
    /// "id_token": ...}`) or a bare opaque token. A bare token yields a
    /// credential with no identity token; identity resolution will then
    /// fail verification as required.
    pub fn from_caller_token(raw: &str) -> Self {
        if let Ok(blob) = serde_json::from_str::<TokenBlob>(raw) {
            if let Some(access_token) = blob.access_token {
                return Self {
                    raw: raw.to_string(),
                    access_token,
                    id_token: blob.id_token,
                };
            }
        }
        Self {
            raw: raw.to_string(),
            access_token: raw.to_string(),
            id_token: None,
        }
    }

    /// Builds a credential from a token endpoint response.
    pub fn from_response(raw_body: &str, response: TokenResponse) -> Self {
        Self {
            raw: raw_body.to_string(),
            access_token: response.access_token,
            id_token: response.id_token,
        }
    }
}

/// Serde mirror of the SDK-style serialized token blob.
#[derive(Debug, Deserialize)]
struct TokenBlob {
    access_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The bearer token authorizing API calls.
    pub access_token: String,
    /// The signed identity token, present when identity scopes were
    /// requested.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Refresh token; unused by this core, the caller owns refresh policy.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Verified identity-token claims.
///
/// Derived from the identity token by the transport's verification step;
/// read-only and consumed once per identity resolution. These are
/// authoritative over any unverified profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthClaims {
    /// Stable subject identifier.
    #[serde(rename = "sub")]
    pub subject: String,
    /// Email address attested by the provider.
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_token_blob_is_parsed() {
        let raw = r#"{"access_token":"ya29.abc","id_token":"eyJhbGciOi.payload.sig"}"#;
        let credential = AccessCredential::from_caller_token(raw);
        assert_eq!(credential.access_token, "ya29.abc");
        assert_eq!(
            credential.id_token.as_deref(),
            Some("eyJhbGciOi.payload.sig")
        );
        assert_eq!(credential.raw, raw);
    }

    #[test]
    fn bare_token_has_no_id_token() {
        let credential = AccessCredential::from_caller_token("ya29.bare");
        assert_eq!(credential.access_token, "ya29.bare");
        assert!(credential.id_token.is_none());
    }

    #[test]
    fn blob_without_access_token_falls_back_to_bare() {
        // Well-formed JSON that is not a token blob is still a bare token.
        let credential = AccessCredential::from_caller_token(r#"{"foo":"bar"}"#);
        assert_eq!(credential.access_token, r#"{"foo":"bar"}"#);
        assert!(credential.id_token.is_none());
    }

    #[test]
    fn parse_token_response() {
        let json = r#"{
            "access_token": "ya29.new",
            "id_token": "eyJ.claims.sig",
            "refresh_token": "1//refresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "ya29.new");
        assert_eq!(response.id_token.as_deref(), Some("eyJ.claims.sig"));
        assert_eq!(response.expires_in, Some(3599));
    }

    #[test]
    fn parse_claims() {
        let json = r#"{"sub": "1234567890", "email": "user@example.com", "aud": "client-id"}"#;
        let claims: AuthClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.subject, "1234567890");
        assert_eq!(claims.email, "user@example.com");
    }
}

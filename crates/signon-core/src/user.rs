//! Provider-agnostic records produced by single-sign-on strategies.
//!
//! Every strategy implementation, whatever the identity provider behind it,
//! resolves to the same two records: a [`User`] for the authenticated
//! subject and a list of [`Contact`]s for their social graph. Callers never
//! see provider-specific payloads.

use serde::{Deserialize, Serialize};

/// An authenticated user, normalized across providers.
///
/// Produced once per successful `get_user` call; ownership transfers to the
/// caller. The `id` and `email` come from verified identity-token claims,
/// never from the unverified profile response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable subject identifier from the provider.
    pub id: String,
    /// Email address from the verified claims.
    pub email: String,
    /// The access token that authenticated this resolution.
    pub access_token: String,
    /// Given name from the provider profile (empty when absent).
    pub firstname: String,
    /// Family name from the provider profile (empty when absent).
    pub lastname: String,
}

/// A single entry from a provider's contact feed.
///
/// Both fields default to the empty string when the source entry omits
/// them; they are never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// First email address on the feed entry, or empty.
    pub email: String,
    /// Display name (entry title), or empty.
    pub display_name: String,
}

impl Contact {
    /// Creates a contact from optional source fields, defaulting to empty
    /// strings.
    pub fn new(email: Option<String>, display_name: Option<String>) -> Self {
        Self {
            email: email.unwrap_or_default(),
            display_name: display_name.unwrap_or_default(),
        }
    }
}

/// Parameters accepted by `get_user` / `get_friends`.
///
/// Exactly one of the two fields is expected: either a previously issued
/// access token (used as-is) or an authorization code from the provider
/// callback (exchanged at the token endpoint). Supplying neither fails
/// credential resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthParams {
    /// A previously issued access token, trusted directly.
    pub access_token: Option<String>,
    /// An authorization code from the consent-page callback.
    pub code: Option<String>,
}

impl AuthParams {
    /// Creates an empty parameter bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Builder method to set the authorization code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns true if neither an access token nor a code is present.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.code.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_defaults_to_empty_strings() {
        let contact = Contact::new(None, None);
        assert_eq!(contact.email, "");
        assert_eq!(contact.display_name, "");
    }

    #[test]
    fn contact_keeps_present_fields() {
        let contact = Contact::new(Some("a@b.com".into()), Some("Ada".into()));
        assert_eq!(contact.email, "a@b.com");
        assert_eq!(contact.display_name, "Ada");
    }

    #[test]
    fn auth_params_builder() {
        let params = AuthParams::new().with_code("4/abc");
        assert_eq!(params.code.as_deref(), Some("4/abc"));
        assert!(params.access_token.is_none());
        assert!(!params.is_empty());
    }

    #[test]
    fn auth_params_empty() {
        assert!(AuthParams::new().is_empty());
    }

    #[test]
    fn user_serde_round_trip() {
        let user = User {
            id: "sub-1".into(),
            email: "a@b.com".into(),
            access_token: "tok".into(),
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }
}

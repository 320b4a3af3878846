//! Google single-sign-on strategy.
//!
//! This module provides a [`GoogleStrategy`] implementing the
//! authorization-code flow against Google's OAuth 2.0 endpoints and the
//! contacts feed.
//!
//! # Flow
//!
//! 1. `login` builds the consent-page URL from the configured scopes and
//!    hands it to the framework's router; the user leaves for Google
//! 2. Google redirects back with the `code` parameter named by `expects`
//! 3. `get_user` exchanges the code (or trusts a supplied access token),
//!    fetches the profile, verifies the identity token, and assembles a
//!    provider-agnostic `User`
//! 4. `get_friends` walks the paginated contacts feed to completion,
//!    following "next" links, and returns one flat `Contact` list
//!
//! # Example
//!
//! ```ignore
//! use signon_providers::google::{GoogleStrategy, RawSettings};
//!
//! let strategy = GoogleStrategy::new(
//!     RawSettings::new()
//!         .with_application_name("soapbox")
//!         .with_redirect_url("https://app.example.com/callback")
//!         .with_client("client-id", "client-secret")
//!         .with_state(csrf_token),
//! )?;
//!
//! strategy.login(&router)?;
//! // ...callback...
//! let user = strategy.get_user(AuthParams::new().with_code(code)).await?;
//! ```

mod config;
mod contacts;
mod oauth;
mod strategy;
mod tokens;
mod transport;

pub use config::{ClientAuth, DEFAULT_SCOPES, GoogleSettings, RawSettings};
pub use contacts::{FeedEmail, FeedEntry, FeedPage, FeedText};
pub use oauth::build_auth_url;
pub use strategy::GoogleStrategy;
pub use tokens::{AccessCredential, AuthClaims, TokenResponse};
pub use transport::{GoogleTransport, HttpTransport, Profile};

//! Google single-sign-on strategy.
//!
//! This module implements the [`SsoStrategy`] trait for Google's OAuth 2.0
//! authorization-code flow.

use std::sync::Arc;

use tracing::info;

use signon_core::{AuthParams, Contact, Router, Session, User};

use crate::error::{StrategyError, StrategyResult};
use crate::strategy::{BoxFuture, SsoStrategy};

use super::config::{GoogleSettings, RawSettings};
use super::contacts::{first_page_url, paginate_feed};
use super::oauth::{build_auth_url, resolve_credential};
use super::transport::{GoogleTransport, HttpTransport};

/// Session key under which the anti-forgery state is stored before the
/// redirect.
const STATE_SESSION_KEY: &str = "oauth_state";

/// Google single-sign-on strategy.
///
/// One instance owns one validated settings bundle and serves one logical
/// request at a time. Credentials resolved during a call chain are threaded
/// through it as values; nothing about an in-flight request is stored on
/// the instance.
pub struct GoogleStrategy<T: GoogleTransport = HttpTransport> {
    settings: GoogleSettings,
    transport: T,
    session: Option<Arc<dyn Session>>,
}

impl<T: GoogleTransport + std::fmt::Debug> std::fmt::Debug for GoogleStrategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleStrategy")
            .field("settings", &self.settings)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl GoogleStrategy<HttpTransport> {
    /// Creates a strategy from a caller-supplied settings bundle.
    ///
    /// Validation happens here, before any network activity; a bundle
    /// missing the application name, the redirect URL, or both credential
    /// forms fails with a configuration error.
    pub fn new(raw: RawSettings) -> StrategyResult<Self> {
        let settings = GoogleSettings::resolve(raw).map_err(|e| e.with_provider("google"))?;
        let transport = HttpTransport::new(&settings)?;
        Ok(Self {
            settings,
            transport,
            session: None,
        })
    }
}

impl<T: GoogleTransport> GoogleStrategy<T> {
    /// Creates a strategy over an explicit transport.
    ///
    /// Used by tests and by hosts that bring their own transport stack.
    pub fn with_transport(settings: GoogleSettings, transport: T) -> Self {
        Self {
            settings,
            transport,
            session: None,
        }
    }

    /// Attaches a session store for per-flow values.
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Returns the validated settings.
    pub fn settings(&self) -> &GoogleSettings {
        &self.settings
    }

    async fn get_user_impl(&self, params: AuthParams) -> StrategyResult<User> {
        let credential = resolve_credential(&self.transport, &params).await?;

        let profile = self.transport.fetch_profile(&credential).await?;

        let id_token = credential.id_token.as_deref().ok_or_else(|| {
            StrategyError::authentication("credential carries no identity token")
                .with_provider("google")
        })?;
        let claims = self.transport.verify_id_token(id_token).await?;

        info!("resolved user for subject {}", claims.subject);
        Ok(User {
            id: claims.subject,
            email: claims.email,
            access_token: credential.raw,
            firstname: profile.given_name.unwrap_or_default(),
            lastname: profile.family_name.unwrap_or_default(),
        })
    }

    async fn get_friends_impl(&self, params: AuthParams) -> StrategyResult<Vec<Contact>> {
        let credential = resolve_credential(&self.transport, &params).await?;

        paginate_feed(
            &self.transport,
            &credential,
            first_page_url(&self.settings),
            self.settings.max_pages,
        )
        .await
    }
}

impl<T: GoogleTransport> SsoStrategy for GoogleStrategy<T> {
    fn name(&self) -> &str {
        "google"
    }

    fn login(&self, router: &dyn Router) -> StrategyResult<()> {
        let url = build_auth_url(&self.settings)?;

        if let (Some(session), Some(state)) = (&self.session, &self.settings.state) {
            session.store(STATE_SESSION_KEY, state);
        }

        info!("redirecting to consent page");
        router.redirect(&url);
        Ok(())
    }

    fn get_user(&self, params: AuthParams) -> BoxFuture<'_, StrategyResult<User>> {
        Box::pin(self.get_user_impl(params))
    }

    fn get_friends(&self, params: AuthParams) -> BoxFuture<'_, StrategyResult<Vec<Contact>>> {
        Box::pin(self.get_friends_impl(params))
    }

    fn expects(&self) -> &[&str] {
        &["code"]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::StrategyErrorCode;
    use crate::google::contacts::{FeedEmail, FeedEntry, FeedPage, FeedText};
    use crate::google::tokens::{AccessCredential, AuthClaims};
    use crate::google::transport::Profile;

    /// In-memory transport serving scripted pages and a single identity.
    struct FakeTransport {
        pages: Vec<StrategyResult<FeedPage>>,
        fetches: AtomicUsize,
        fetched_urls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn new(pages: Vec<StrategyResult<FeedPage>>) -> Self {
            Self {
                pages,
                fetches: AtomicUsize::new(0),
                fetched_urls: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self::new(Vec::new())
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl GoogleTransport for FakeTransport {
        fn exchange_code(&self, code: &str) -> BoxFuture<'_, StrategyResult<AccessCredential>> {
            let result = if code == "valid-code" {
                Ok(AccessCredential {
                    raw: r#"{"access_token":"ya29.exchanged","id_token":"id-token-1"}"#.into(),
                    access_token: "ya29.exchanged".into(),
                    id_token: Some("id-token-1".into()),
                })
            } else {
                Err(StrategyError::authentication("token exchange failed"))
            };
            Box::pin(async move { result })
        }

        fn fetch_profile(
            &self,
            _credential: &AccessCredential,
        ) -> BoxFuture<'_, StrategyResult<Profile>> {
            Box::pin(async {
                Ok(Profile {
                    given_name: Some("Ada".into()),
                    family_name: Some("Lovelace".into()),
                })
            })
        }

        fn verify_id_token(&self, id_token: &str) -> BoxFuture<'_, StrategyResult<AuthClaims>> {
            let result = if id_token == "id-token-1" {
                Ok(AuthClaims {
                    subject: "subject-1".into(),
                    email: "ada@example.com".into(),
                })
            } else {
                Err(StrategyError::authentication(
                    "identity token verification failed",
                ))
            };
            Box::pin(async move { result })
        }

        fn fetch_feed_page(
            &self,
            url: &str,
            _credential: &AccessCredential,
        ) -> BoxFuture<'_, StrategyResult<FeedPage>> {
            let index = self.fetches.fetch_add(1, Ordering::SeqCst);
            self.fetched_urls.lock().unwrap().push(url.to_string());
            let result = match self.pages.get(index) {
                Some(Ok(page)) => Ok(page.clone()),
                Some(Err(e)) => Err(StrategyError::new(e.code(), e.message())),
                None => Err(StrategyError::internal("no page scripted for this fetch")),
            };
            Box::pin(async move { result })
        }
    }

    fn settings() -> GoogleSettings {
        GoogleSettings::resolve(
            RawSettings::new()
                .with_application_name("soapbox")
                .with_redirect_url("https://app.example.com/callback")
                .with_client("client-id", "client-secret"),
        )
        .unwrap()
    }

    fn strategy(transport: FakeTransport) -> GoogleStrategy<FakeTransport> {
        GoogleStrategy::with_transport(settings(), transport)
    }

    /// The SDK-style token blob a returning caller supplies.
    fn token_blob() -> String {
        r#"{"access_token":"ya29.session","id_token":"id-token-1"}"#.to_string()
    }

    fn entry(n: usize) -> FeedEntry {
        FeedEntry {
            title: Some(FeedText {
                value: Some(format!("Contact {}", n)),
            }),
            emails: vec![FeedEmail {
                address: Some(format!("contact{}@example.com", n)),
            }],
        }
    }

    fn page(start: usize, count: usize, next: Option<&str>) -> FeedPage {
        FeedPage {
            entries: (start..start + count).map(entry).collect(),
            next: next.map(String::from),
        }
    }

    #[test]
    fn strategy_name_and_expects() {
        let strategy = strategy(FakeTransport::empty());
        assert_eq!(strategy.name(), "google");
        assert_eq!(strategy.expects(), &["code"]);
    }

    #[test]
    fn construction_rejects_invalid_settings() {
        let err = GoogleStrategy::new(RawSettings::new()).unwrap_err();
        assert_eq!(err.code(), StrategyErrorCode::ConfigurationError);
        assert_eq!(err.provider(), Some("google"));
    }

    #[test]
    fn login_redirects_and_stores_state() {
        struct CapturingRouter(Mutex<Option<String>>);
        impl Router for CapturingRouter {
            fn redirect(&self, url: &str) {
                *self.0.lock().unwrap() = Some(url.to_string());
            }
        }

        struct MapSession(Mutex<std::collections::HashMap<String, String>>);
        impl Session for MapSession {
            fn store(&self, key: &str, value: &str) {
                self.0.lock().unwrap().insert(key.into(), value.into());
            }
            fn load(&self, key: &str) -> Option<String> {
                self.0.lock().unwrap().get(key).cloned()
            }
        }

        let session = Arc::new(MapSession(Mutex::new(Default::default())));
        let strategy = GoogleStrategy::with_transport(
            GoogleSettings::resolve(
                RawSettings::new()
                    .with_application_name("soapbox")
                    .with_redirect_url("https://app.example.com/callback")
                    .with_client("client-id", "client-secret")
                    .with_state("anti-forgery"),
            )
            .unwrap(),
            FakeTransport::empty(),
        )
        .with_session(session.clone());

        let router = CapturingRouter(Mutex::new(None));
        strategy.login(&router).unwrap();

        let url = router.0.lock().unwrap().clone().unwrap();
        assert!(url.contains("state=anti-forgery"));
        assert_eq!(
            session.load(STATE_SESSION_KEY).as_deref(),
            Some("anti-forgery")
        );
    }

    #[tokio::test]
    async fn get_user_via_access_token() {
        let strategy = strategy(FakeTransport::empty());
        let params = AuthParams::new().with_access_token(token_blob());

        let user = strategy.get_user(params).await.unwrap();
        assert_eq!(user.id, "subject-1");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.firstname, "Ada");
        assert_eq!(user.lastname, "Lovelace");
        assert_eq!(user.access_token, token_blob());
    }

    #[tokio::test]
    async fn get_user_via_code_matches_token_path() {
        let by_code = strategy(FakeTransport::empty())
            .get_user(AuthParams::new().with_code("valid-code"))
            .await
            .unwrap();
        let by_token = strategy(FakeTransport::empty())
            .get_user(AuthParams::new().with_access_token(token_blob()))
            .await
            .unwrap();

        // Equal in all fields except the raw token string, which differs
        // by acquisition path.
        assert_eq!(by_code.id, by_token.id);
        assert_eq!(by_code.email, by_token.email);
        assert_eq!(by_code.firstname, by_token.firstname);
        assert_eq!(by_code.lastname, by_token.lastname);
    }

    #[tokio::test]
    async fn get_user_without_params_fails() {
        let strategy = strategy(FakeTransport::empty());
        let err = strategy.get_user(AuthParams::new()).await.unwrap_err();
        assert_eq!(err.code(), StrategyErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn get_user_with_bad_code_fails() {
        let strategy = strategy(FakeTransport::empty());
        let err = strategy
            .get_user(AuthParams::new().with_code("bad-code"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), StrategyErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn get_user_requires_identity_token() {
        // A bare token has no identity token bundled; verification is
        // mandatory, so the whole call fails.
        let strategy = strategy(FakeTransport::empty());
        let err = strategy
            .get_user(AuthParams::new().with_access_token("ya29.bare"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), StrategyErrorCode::AuthenticationFailed);
        assert!(err.message().contains("identity token"));
    }

    #[tokio::test]
    async fn get_user_with_unverifiable_identity_token_fails() {
        let strategy = strategy(FakeTransport::empty());
        let blob = r#"{"access_token":"ya29.session","id_token":"forged"}"#;
        let err = strategy
            .get_user(AuthParams::new().with_access_token(blob))
            .await
            .unwrap_err();
        assert_eq!(err.code(), StrategyErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn get_friends_merges_pages_in_order() {
        let transport = FakeTransport::new(vec![
            Ok(page(0, 700, Some("https://example.com/page2"))),
            Ok(page(700, 700, Some("https://example.com/page3"))),
            Ok(page(1400, 50, None)),
        ]);
        let strategy = strategy(transport);

        let friends = strategy
            .get_friends(AuthParams::new().with_access_token(token_blob()))
            .await
            .unwrap();

        assert_eq!(friends.len(), 1450);
        assert_eq!(strategy.transport.fetch_count(), 3);
        assert_eq!(friends[0].email, "contact0@example.com");
        assert_eq!(friends[700].email, "contact700@example.com");
        assert_eq!(friends[1449].display_name, "Contact 1449");

        let urls = strategy.transport.fetched_urls.lock().unwrap().clone();
        assert!(urls[0].contains("max-results=700"));
        assert_eq!(urls[1], "https://example.com/page2");
        assert_eq!(urls[2], "https://example.com/page3");
    }

    #[tokio::test]
    async fn get_friends_failure_mid_pagination_discards_everything() {
        let transport = FakeTransport::new(vec![
            Ok(page(0, 700, Some("https://example.com/page2"))),
            Err(StrategyError::network("connection reset")),
            Ok(page(700, 50, None)),
        ]);
        let strategy = strategy(transport);

        let err = strategy
            .get_friends(AuthParams::new().with_access_token(token_blob()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), StrategyErrorCode::NetworkError);
        assert_eq!(strategy.transport.fetch_count(), 2);
    }

    #[tokio::test]
    async fn get_friends_without_params_fails_before_any_fetch() {
        let strategy = strategy(FakeTransport::empty());
        let err = strategy.get_friends(AuthParams::new()).await.unwrap_err();
        assert_eq!(err.code(), StrategyErrorCode::AuthenticationFailed);
        assert_eq!(strategy.transport.fetch_count(), 0);
    }

    #[tokio::test]
    async fn get_friends_hits_pagination_ceiling() {
        // Every page points at another one; the ceiling turns the runaway
        // feed into a defined failure.
        let pages = (0..5)
            .map(|n| Ok(page(n, 1, Some("https://example.com/again"))))
            .collect();
        let strategy = GoogleStrategy::with_transport(
            settings().with_max_pages(3),
            FakeTransport::new(pages),
        );

        let err = strategy
            .get_friends(AuthParams::new().with_access_token(token_blob()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), StrategyErrorCode::PaginationLimitExceeded);
        assert_eq!(strategy.transport.fetch_count(), 3);
    }

    #[tokio::test]
    async fn get_friends_defaults_missing_fields_to_empty() {
        let transport = FakeTransport::new(vec![Ok(FeedPage {
            entries: vec![FeedEntry::default()],
            next: None,
        })]);
        let strategy = strategy(transport);

        let friends = strategy
            .get_friends(AuthParams::new().with_access_token(token_blob()))
            .await
            .unwrap();

        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].email, "");
        assert_eq!(friends[0].display_name, "");
    }

    #[tokio::test]
    async fn strategy_is_object_safe() {
        let strategy: Box<dyn SsoStrategy> = Box::new(strategy(FakeTransport::empty()));
        assert_eq!(strategy.name(), "google");
        assert!(strategy.get_user(AuthParams::new()).await.is_err());
    }
}

//! SsoStrategy trait definition.
//!
//! This module defines the [`SsoStrategy`] trait, which is the core
//! abstraction for single-sign-on backends (Google, Facebook, etc.).
//!
//! Strategies are responsible for:
//! - Sending the user to the provider's consent page
//! - Exchanging callback parameters for an access credential
//! - Normalizing provider responses into [`User`] and [`Contact`] records
//!
//! Callers hold a `&dyn SsoStrategy` (or `Box<dyn SsoStrategy>`), never a
//! concrete provider type, so providers can be swapped without changing
//! calling code.

use std::future::Future;
use std::pin::Pin;

use signon_core::{AuthParams, Contact, Router, User};

use crate::error::{StrategyError, StrategyResult};

/// A boxed future for async trait methods.
///
/// This is used because async functions in traits are not yet stable in a way
/// that works well with dynamic dispatch. Using boxed futures allows the trait
/// to be object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core abstraction for single-sign-on strategies.
///
/// This trait defines the interface that all identity-provider backends
/// must implement. One strategy instance owns one validated settings bundle
/// and serves one logical request at a time; concurrent use by multiple
/// logical users requires external serialization or one instance per
/// request.
///
/// # Implementation Notes
///
/// - Implementations should be `Send + Sync` for use in async contexts
/// - Credentials are threaded through each call chain as values, never
///   stored as mutable instance state
/// - Transport failures propagate unchanged; strategies do not retry
pub trait SsoStrategy: Send + Sync {
    /// Returns the name of this provider (e.g., "google").
    fn name(&self) -> &str;

    /// Sends the user to the provider's consent page.
    ///
    /// Builds the authorization URL from the configured scopes and hands it
    /// to the router, which performs the actual HTTP redirect. This call is
    /// terminal for the current request; control returns to this process
    /// only through the callback parameters named by [`expects`].
    ///
    /// [`expects`]: SsoStrategy::expects
    fn login(&self, router: &dyn Router) -> StrategyResult<()>;

    /// Resolves the authenticated user behind the given parameters.
    ///
    /// Accepts either a previously issued access token or an authorization
    /// code from the callback. Either a fully populated [`User`] is
    /// returned or the whole call fails; no partial record is ever
    /// produced.
    ///
    /// # Errors
    ///
    /// Fails with an authentication error when neither parameter yields a
    /// usable credential or when identity-token verification fails.
    fn get_user(&self, params: AuthParams) -> BoxFuture<'_, StrategyResult<User>>;

    /// Retrieves the user's complete contact list.
    ///
    /// Walks the provider's paginated feed to completion and returns one
    /// flat list preserving page-then-within-page order. A failure on any
    /// page fails the whole call; pages already fetched are discarded.
    fn get_friends(&self, params: AuthParams) -> BoxFuture<'_, StrategyResult<Vec<Contact>>>;

    /// Returns the callback parameters the surrounding framework must
    /// capture to resume the flow after [`login`].
    ///
    /// [`login`]: SsoStrategy::login
    fn expects(&self) -> &[&str] {
        &["code"]
    }
}

/// A strategy that always returns an error.
///
/// This is useful for testing or as a placeholder when a provider
/// fails to initialize.
#[derive(Debug)]
pub struct ErrorStrategy {
    name: String,
    error: StrategyError,
}

impl ErrorStrategy {
    /// Creates a new error strategy.
    pub fn new(name: impl Into<String>, error: StrategyError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn make_error(&self) -> StrategyError {
        // Clone the error details since we can't clone StrategyError directly
        StrategyError::new(self.error.code(), self.error.message()).with_provider(&self.name)
    }
}

impl SsoStrategy for ErrorStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn login(&self, _router: &dyn Router) -> StrategyResult<()> {
        Err(self.make_error())
    }

    fn get_user(&self, _params: AuthParams) -> BoxFuture<'_, StrategyResult<User>> {
        let error = self.make_error();
        Box::pin(async move { Err(error) })
    }

    fn get_friends(&self, _params: AuthParams) -> BoxFuture<'_, StrategyResult<Vec<Contact>>> {
        let error = self.make_error();
        Box::pin(async move { Err(error) })
    }
}

//! SsoStrategy trait and provider implementations.
//!
//! This crate provides the abstraction layer for single-sign-on backends:
//!
//! - [`SsoStrategy`] - The core trait every identity provider implements
//! - [`StrategyError`] - Error types for strategy operations
//! - [`google`] - The Google authorization-code flow implementation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │  Google OAuth   │     │  other provider │
//! └────────┬────────┘     └────────┬────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │ GoogleStrategy  │     │       ...       │
//! └────────┬────────┘     └────────┬────────┘
//!          │      SsoStrategy      │
//!          └──────────┬────────────┘
//!                     │
//!                     ▼
//!          ┌─────────────────────┐
//!          │   User / Contact    │
//!          └─────────────────────┘
//! ```
//!
//! Callers hold a `&dyn SsoStrategy` and switch providers without changing
//! their own logic:
//!
//! ```ignore
//! use signon_providers::{SsoStrategy, google::GoogleStrategy};
//!
//! async fn callback(strategy: &dyn SsoStrategy, code: String) -> StrategyResult<User> {
//!     strategy.get_user(AuthParams::new().with_code(code)).await
//! }
//! ```

pub mod error;
pub mod google;
pub mod strategy;

// Re-export main types at crate root
pub use error::{StrategyError, StrategyErrorCode, StrategyResult};
pub use strategy::{BoxFuture, ErrorStrategy, SsoStrategy};

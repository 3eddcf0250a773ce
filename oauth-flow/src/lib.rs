//! # oauth-flow
//!
//! Three-legged OAuth authorization for web applications, over both OAuth 1.0a
//! and OAuth 2.0 providers:
//! - Provider registry with a built-in catalog of well-known endpoints
//! - Authorization URL building with opaque flow state carried across the redirect
//! - Callback handling and grant/verifier exchange for access tokens
//! - Token and pending-state storage behind a session store trait
//!
//! Protocol mechanics are delegated to the `oauth2` and `oauth1-request` crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_flow::{
//!     credentials::ConfigCredentialStore,
//!     http::HttpClientBuilder,
//!     oauth::{token::MemorySession, OAuth, Registry},
//! };
//!
//! let registry = Registry::with_default_providers(&HttpClientBuilder::new())?;
//! let oauth = OAuth::new(Arc::new(registry), Arc::new(credentials), MemorySession::new());
//! let url = oauth.authorization_uri("github", Some("/dashboard"), None).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};

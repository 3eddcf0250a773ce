//! Provider protocol versions, credentials and client traits.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use super::token::{OAuth1Token, OAuth2Token, RequestToken};
use crate::error::Error;

/// The OAuth protocol version a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "oauth1")]
    OAuth1,
    #[serde(rename = "oauth2")]
    OAuth2,
}

impl ProtocolVersion {
    /// Get the protocol identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::OAuth1 => "oauth1",
            ProtocolVersion::OAuth2 => "oauth2",
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client credentials for a provider, built from configuration.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Client id (OAuth2) or consumer key (OAuth1).
    pub client_id: String,
    /// Client secret (OAuth2) or consumer secret (OAuth1).
    pub client_secret: SecretString,
    /// Where the provider sends the user back to, `{base_url}/oauth/{provider}`.
    pub callback_url: Url,
}

/// Trait for OAuth 2.0 provider clients.
///
/// Implementations wrap an external OAuth 2.0 client; the flow never speaks the
/// wire protocol itself.
#[async_trait]
pub trait OAuth2Service: Send + Sync {
    /// Build the authorization endpoint URL carrying `state`.
    fn authorization_uri(&self, state: &str) -> Result<Url, Error>;

    /// Exchange an authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from the OAuth callback
    async fn request_access_token(&self, code: &str) -> Result<OAuth2Token, Error>;
}

/// Trait for OAuth 1.0a provider clients.
#[async_trait]
pub trait OAuth1Service: Send + Sync {
    /// Obtain temporary credentials from the provider's request token endpoint.
    async fn request_request_token(&self) -> Result<RequestToken, Error>;

    /// Build the authorization endpoint URL for `request_token`.
    fn authorization_uri(&self, request_token: &str) -> Result<Url, Error>;

    /// Exchange the authorized request token for an access token.
    ///
    /// # Arguments
    ///
    /// * `token` - The `oauth_token` returned on the callback
    /// * `verifier` - The `oauth_verifier` returned on the callback
    /// * `token_secret` - Secret of the pending request token
    async fn request_access_token(
        &self,
        token: &str,
        verifier: Option<&str>,
        token_secret: &SecretString,
    ) -> Result<OAuth1Token, Error>;
}

/// A provider client resolved from the registry.
pub enum Service {
    OAuth1(Box<dyn OAuth1Service>),
    OAuth2(Box<dyn OAuth2Service>),
}

impl Service {
    pub fn protocol_version(&self) -> ProtocolVersion {
        match self {
            Service::OAuth1(_) => ProtocolVersion::OAuth1,
            Service::OAuth2(_) => ProtocolVersion::OAuth2,
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Service").field(&self.protocol_version()).finish()
    }
}

//! Explicit provider registry: provider name to protocol version and client constructor.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::provider::{Credentials, OAuth1Service, OAuth2Service, ProtocolVersion, Service};
use crate::error::{service_not_supported, Error};
use crate::http::HttpClientBuilder;

/// Builds an OAuth 1.0a client from credentials.
pub type OAuth1Constructor =
    Arc<dyn Fn(Credentials) -> Result<Box<dyn OAuth1Service>, Error> + Send + Sync>;

/// Builds an OAuth 2.0 client from credentials and the scopes to request.
pub type OAuth2Constructor =
    Arc<dyn Fn(Credentials, Vec<String>) -> Result<Box<dyn OAuth2Service>, Error> + Send + Sync>;

/// A registered provider. The variant is the provider's protocol version.
#[derive(Clone)]
pub enum Constructor {
    OAuth1(OAuth1Constructor),
    OAuth2(OAuth2Constructor),
}

impl Constructor {
    pub fn protocol_version(&self) -> ProtocolVersion {
        match self {
            Constructor::OAuth1(_) => ProtocolVersion::OAuth1,
            Constructor::OAuth2(_) => ProtocolVersion::OAuth2,
        }
    }
}

/// Provider names are matched case-insensitively.
pub fn normalize(provider: &str) -> String {
    provider.trim().to_lowercase()
}

/// Table of supported providers.
///
/// Each name maps to exactly one constructor, so a provider is always either
/// OAuth1 or OAuth2, never both.
#[derive(Clone, Default)]
pub struct Registry {
    providers: HashMap<String, Constructor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in provider catalog.
    pub fn with_default_providers(http: &HttpClientBuilder) -> Result<Self, Error> {
        let mut registry = Self::new();
        super::providers::register_defaults(&mut registry, http)?;
        Ok(registry)
    }

    /// Register (or replace) an OAuth 1.0a provider.
    pub fn register_oauth1<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn(Credentials) -> Result<Box<dyn OAuth1Service>, Error> + Send + Sync + 'static,
    {
        self.providers
            .insert(normalize(name), Constructor::OAuth1(Arc::new(constructor)));
        self
    }

    /// Register (or replace) an OAuth 2.0 provider.
    pub fn register_oauth2<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn(Credentials, Vec<String>) -> Result<Box<dyn OAuth2Service>, Error>
            + Send
            + Sync
            + 'static,
    {
        self.providers
            .insert(normalize(name), Constructor::OAuth2(Arc::new(constructor)));
        self
    }

    /// The protocol version of `provider`, if registered.
    pub fn protocol_version(&self, provider: &str) -> Option<ProtocolVersion> {
        self.providers
            .get(&normalize(provider))
            .map(Constructor::protocol_version)
    }

    pub fn service_exists(&self, provider: &str) -> bool {
        self.protocol_version(provider).is_some()
    }

    pub fn is_oauth1(&self, provider: &str) -> bool {
        self.protocol_version(provider) == Some(ProtocolVersion::OAuth1)
    }

    pub fn is_oauth2(&self, provider: &str) -> bool {
        self.protocol_version(provider) == Some(ProtocolVersion::OAuth2)
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the client for `provider`.
    ///
    /// Scopes are only passed to OAuth 2.0 clients; OAuth 1.0a has no scope parameter.
    pub fn create(
        &self,
        provider: &str,
        credentials: Credentials,
        scopes: Vec<String>,
    ) -> Result<Service, Error> {
        match self.providers.get(&normalize(provider)) {
            Some(Constructor::OAuth1(constructor)) => Ok(Service::OAuth1(constructor(credentials)?)),
            Some(Constructor::OAuth2(constructor)) => {
                Ok(Service::OAuth2(constructor(credentials, scopes)?))
            }
            None => Err(service_not_supported(provider)),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.names() {
            if let Some(constructor) = self.providers.get(name) {
                map.entry(&name, &constructor.protocol_version());
            }
        }
        map.finish()
    }
}

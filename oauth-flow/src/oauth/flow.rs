//! Authorization flow orchestration across both protocol versions.
//!
//! [`OAuth`] ties the provider registry, the configured credentials and a
//! session store together:
//!
//! 1. [`OAuth::authorization_uri`] builds the URL the user is sent to. For OAuth2
//!    the encoded flow state travels in the `state` parameter; for OAuth1 a
//!    request token is obtained first and the state is kept in the session.
//! 2. The provider redirects back to `oauth/{provider}`, where
//!    [`OAuth::request_access_token`] exchanges the grant and stores the token.
//! 3. [`OAuth::redirect_from_state`] recovers where the user wanted to go.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::callback::CallbackParams;
use super::provider::{ProtocolVersion, Service};
use super::registry::{normalize, Registry};
use super::state::{decode_state, encode_state, FlowState};
use super::token::{
    access_token_key, request_token_key, state_key, AccessToken, PlainAccessToken,
    PlainRequestToken, RequestToken, SessionStore,
};
use crate::credentials::{parse_scopes, CredentialStore};
use crate::error::{oauth_error, service_not_supported, user_denied, Error, OAuthErrorKind};

/// The OAuth2 `error` value sent when the user declines.
const ACCESS_DENIED: &str = "access_denied";

/// A request to start the authorization flow for a provider.
///
/// Creating a directive has no side effects; it is turned into a URL by
/// [`OAuth::authorization_uri_for`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoginDirective {
    provider: String,
    state: FlowState,
}

impl LoginDirective {
    pub fn new(provider: &str, redirect: Option<&str>) -> Self {
        Self {
            provider: normalize(provider),
            state: match redirect {
                Some(redirect) => FlowState::with_redirect(redirect),
                None => FlowState::new(),
            },
        }
    }

    /// Add a caller-supplied field to the flow state.
    ///
    /// `redirect` sets the redirect path: a string replaces it and `null`
    /// clears it. Any other value is ignored.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key != FlowState::REDIRECT_KEY {
            self.state.insert(key, value);
            return self;
        }

        match value {
            Value::String(redirect) => self.state.redirect = Some(redirect),
            Value::Null => self.state.redirect = None,
            other => warn!("Ignoring non-string redirect {} for {}", other, self.provider),
        }
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn redirect(&self) -> Option<&str> {
        self.state.redirect.as_deref()
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }
}

/// Authorization flow orchestrator bound to one session.
pub struct OAuth<S> {
    registry: Arc<Registry>,
    credentials: Arc<dyn CredentialStore>,
    session: S,
}

impl<S: SessionStore> OAuth<S> {
    pub fn new(registry: Arc<Registry>, credentials: Arc<dyn CredentialStore>, session: S) -> Self {
        Self {
            registry,
            credentials,
            session,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Start a login for `provider`, remembering `redirect` in the flow state.
    pub fn login(&self, provider: &str, redirect: Option<&str>) -> LoginDirective {
        LoginDirective::new(provider, redirect)
    }

    /// The configured default scopes for `provider`.
    pub fn scopes(&self, provider: &str) -> Vec<String> {
        self.credentials.scopes(&normalize(provider))
    }

    /// Construct the client for `provider`.
    ///
    /// A non-empty `scope` override (comma separated) replaces the configured
    /// scopes.
    pub fn service(&self, provider: &str, scope: Option<&str>) -> Result<Service, Error> {
        let provider = normalize(provider);
        if !self.registry.service_exists(&provider) {
            return Err(service_not_supported(&provider));
        }

        let credentials = self.credentials.credentials(&provider)?;
        let scopes = scope
            .map(parse_scopes)
            .filter(|scopes| !scopes.is_empty())
            .unwrap_or_else(|| self.scopes(&provider));

        self.registry.create(&provider, credentials, scopes)
    }

    /// Build the provider authorization URL for a fresh login.
    pub async fn authorization_uri(
        &self,
        provider: &str,
        redirect: Option<&str>,
        scope: Option<&str>,
    ) -> Result<Url, Error> {
        let directive = self.login(provider, redirect);
        self.authorization_uri_for(&directive, scope).await
    }

    /// Build the provider authorization URL for `directive`.
    ///
    /// For OAuth1 this obtains a request token and stores it, together with the
    /// encoded flow state, in the session. A pending request token from an
    /// earlier, unfinished login is replaced along with its state.
    pub async fn authorization_uri_for(
        &self,
        directive: &LoginDirective,
        scope: Option<&str>,
    ) -> Result<Url, Error> {
        let provider = directive.provider();
        let state = encode_state(directive.state())?;

        let url = match self.service(provider, scope)? {
            Service::OAuth2(service) => service.authorization_uri(&state)?,
            Service::OAuth1(service) => {
                let request_token = service.request_request_token().await?;
                debug!("Obtained OAuth1 request token for {}", provider);

                if let Some(replaced) = self.pending_request_token(provider).await? {
                    self.session.remove(&state_key(&replaced.token)).await?;
                }
                self.session
                    .set(
                        &request_token_key(provider),
                        serde_json::to_value(PlainRequestToken::from(&request_token))?,
                    )
                    .await?;
                self.session
                    .set(&state_key(&request_token.token), Value::String(state))
                    .await?;

                service.authorization_uri(&request_token.token)?
            }
        };

        info!("Redirecting to {} for authorization", provider);
        Ok(url)
    }

    /// Complete the flow on the callback: exchange the grant for an access
    /// token and store it under `oauth_token_{provider}`.
    pub async fn request_access_token(
        &self,
        provider: &str,
        params: &CallbackParams,
    ) -> Result<AccessToken, Error> {
        let provider = normalize(provider);

        // Callback errors take precedence over missing credentials.
        let grant = match self.registry.protocol_version(&provider) {
            None => return Err(service_not_supported(&provider)),
            Some(ProtocolVersion::OAuth2) => authorization_code(&provider, params)?,
            Some(ProtocolVersion::OAuth1) => callback_request_token(&provider, params)?,
        };

        let token = match self.service(&provider, None)? {
            Service::OAuth2(service) => {
                AccessToken::OAuth2(service.request_access_token(grant).await?)
            }
            Service::OAuth1(service) => {
                let pending = self.pending_request_token(&provider).await?.ok_or_else(|| {
                    oauth_error(
                        OAuthErrorKind::MissingToken,
                        &format!("No pending request token for {}", provider),
                    )
                })?;

                if pending.token != grant {
                    return Err(oauth_error(
                        OAuthErrorKind::InvalidResponse,
                        "OAuth token does not match the pending request token",
                    ));
                }

                let token = service
                    .request_access_token(grant, params.oauth_verifier(), &pending.secret)
                    .await?;
                self.session.remove(&request_token_key(&provider)).await?;
                self.session.remove(&state_key(grant)).await?;

                AccessToken::OAuth1(token)
            }
        };

        self.session
            .set(
                &access_token_key(&provider),
                serde_json::to_value(token.clone().into_plain())?,
            )
            .await?;
        info!(
            "Stored {} access token for {}",
            token.protocol_version(),
            provider
        );

        Ok(token)
    }

    /// The `redirect` recorded in the flow state for this callback, if any.
    pub async fn redirect_from_state(
        &self,
        provider: &str,
        params: &CallbackParams,
    ) -> Result<Option<String>, Error> {
        let provider = normalize(provider);

        let encoded = match self.registry.protocol_version(&provider) {
            None => return Err(service_not_supported(&provider)),
            Some(ProtocolVersion::OAuth2) => params.state().map(str::to_string),
            Some(ProtocolVersion::OAuth1) => {
                let request_token = match params.oauth_token() {
                    Some(token) => Some(token.to_string()),
                    None => self
                        .pending_request_token(&provider)
                        .await?
                        .map(|pending| pending.token),
                };

                match request_token {
                    Some(token) => self
                        .session
                        .get(&state_key(&token))
                        .await?
                        .and_then(|value| value.as_str().map(str::to_string)),
                    None => None,
                }
            }
        };

        match encoded {
            Some(encoded) => Ok(decode_state(&encoded)?.redirect),
            None => Ok(None),
        }
    }

    /// The stored access token for `provider`.
    pub async fn token(&self, provider: &str) -> Result<Option<AccessToken>, Error> {
        match self.session.get(&access_token_key(&normalize(provider))).await? {
            Some(value) => {
                let plain: PlainAccessToken = serde_json::from_value(value)?;
                Ok(Some(plain.into()))
            }
            None => Ok(None),
        }
    }

    pub async fn has_token(&self, provider: &str) -> Result<bool, Error> {
        self.session
            .has(&access_token_key(&normalize(provider)))
            .await
    }

    /// Remove the stored access token for `provider`.
    pub async fn forget_token(&self, provider: &str) -> Result<(), Error> {
        let provider = normalize(provider);
        self.session.remove(&access_token_key(&provider)).await?;
        debug!("Forgot access token for {}", provider);
        Ok(())
    }

    async fn pending_request_token(&self, provider: &str) -> Result<Option<RequestToken>, Error> {
        match self.session.get(&request_token_key(provider)).await? {
            Some(value) => {
                let plain: PlainRequestToken = serde_json::from_value(value)?;
                Ok(Some(plain.into()))
            }
            None => Ok(None),
        }
    }
}

/// The authorization code from an OAuth2 callback, or the error it reports.
fn authorization_code<'a>(provider: &str, params: &'a CallbackParams) -> Result<&'a str, Error> {
    if let Some(error) = params.error() {
        let message = params.error_message().unwrap_or(error);
        warn!("{} returned an authorization error: {}", provider, message);
        if error == ACCESS_DENIED {
            return Err(user_denied(message));
        }
        return Err(oauth_error(OAuthErrorKind::ProviderError, message));
    }

    params
        .code()
        .ok_or_else(|| oauth_error(OAuthErrorKind::MissingCode, "Authorization code not found"))
}

/// The request token an OAuth1 callback returns with.
fn callback_request_token<'a>(
    provider: &str,
    params: &'a CallbackParams,
) -> Result<&'a str, Error> {
    if params.is_denied() {
        warn!("User denied {} authorization", provider);
        return Err(user_denied("User Denied OAuth Permissions"));
    }

    params
        .oauth_token()
        .ok_or_else(|| oauth_error(OAuthErrorKind::MissingToken, "OAuth token not found"))
}

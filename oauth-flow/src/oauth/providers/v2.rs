//! OAuth 2.0 provider client backed by the `oauth2` crate.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse, BasicTokenType};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::error::{http_error, oauth_error, Error, HttpErrorKind, OAuthErrorKind};
use crate::oauth::token::OAuth2Token;
use crate::oauth::{Credentials, OAuth2Service};

/// Authorization and token endpoints of an OAuth 2.0 provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub authorization_url: String,
    pub token_url: String,
}

impl Endpoints {
    pub fn new(authorization_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            authorization_url: authorization_url.into(),
            token_url: token_url.into(),
        }
    }
}

/// OAuth 2.0 authorization code client.
pub struct Client {
    inner: BasicClient,
    scopes: Vec<String>,
    timeout: Duration,
}

impl Client {
    /// Create a new OAuth 2.0 client.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client id, secret and callback URL
    /// * `scopes` - Scopes requested on the authorization URL
    /// * `endpoints` - Provider authorization and token endpoints
    /// * `timeout` - Upper bound for the code exchange
    pub fn new(
        credentials: Credentials,
        scopes: Vec<String>,
        endpoints: &Endpoints,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let inner = BasicClient::new(
            ClientId::new(credentials.client_id),
            Some(ClientSecret::new(
                credentials.client_secret.expose_secret().to_string(),
            )),
            AuthUrl::new(endpoints.authorization_url.clone())?,
            Some(TokenUrl::new(endpoints.token_url.clone())?),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(RedirectUrl::new(credentials.callback_url.to_string())?);

        Ok(Self {
            inner,
            scopes,
            timeout,
        })
    }

    fn token_from(&self, response: BasicTokenResponse) -> OAuth2Token {
        let expires_at = response
            .expires_in()
            .and_then(|expires_in| chrono::Duration::from_std(expires_in).ok())
            .map(|expires_in| Utc::now() + expires_in);

        let scopes = response
            .scopes()
            .map(|scopes| scopes.iter().map(|scope| scope.as_str().to_string()).collect())
            .unwrap_or_else(|| self.scopes.clone());

        let token_type = match response.token_type() {
            BasicTokenType::Bearer => "Bearer".to_string(),
            BasicTokenType::Mac => "MAC".to_string(),
            BasicTokenType::Extension(other) => other.clone(),
        };

        OAuth2Token {
            access_token: SecretString::from(response.access_token().secret().clone()),
            refresh_token: response
                .refresh_token()
                .map(|rt| SecretString::from(rt.secret().clone())),
            expires_at,
            token_type,
            scopes,
        }
    }
}

/// Message for a failed exchange: the provider's `error_description` when it sent one.
fn exchange_error_message<RE>(err: &RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: StdError + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => response
            .error_description()
            .cloned()
            .unwrap_or_else(|| response.error().to_string()),
        other => other.to_string(),
    }
}

#[async_trait]
impl OAuth2Service for Client {
    fn authorization_uri(&self, state: &str) -> Result<Url, Error> {
        let state = state.to_string();
        let (url, _csrf_token) = self
            .inner
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .url();

        Ok(url)
    }

    async fn request_access_token(&self, code: &str) -> Result<OAuth2Token, Error> {
        debug!("Exchanging OAuth2 authorization code for tokens");

        let exchange = self
            .inner
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client);

        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                warn!("OAuth2 token exchange timed out after {:?}", self.timeout);
                http_error(HttpErrorKind::Timeout, "Token exchange timed out")
            })?
            .map_err(|e| {
                let message = exchange_error_message(&e);
                warn!("OAuth2 token exchange failed: {}", message);
                oauth_error(OAuthErrorKind::TokenExchangeFailed, &message)
            })?;

        Ok(self.token_from(response))
    }
}

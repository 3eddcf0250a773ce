//! OAuth token types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::oauth::ProtocolVersion;

/// OAuth 2.0 access token with metadata.
#[derive(Debug, Clone)]
pub struct OAuth2Token {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<SecretString>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl OAuth2Token {
    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| {
                let now = Utc::now();
                let buffer = chrono::Duration::minutes(5);
                expires <= (now + buffer)
            })
            .unwrap_or(false)
    }
}

/// OAuth 1.0a access token.
#[derive(Debug, Clone)]
pub struct OAuth1Token {
    pub token: SecretString,
    pub secret: SecretString,
    /// Any additional parameters the provider returned (e.g. `user_id`, `screen_name`).
    pub extra_params: BTreeMap<String, String>,
}

/// OAuth 1.0a temporary credentials obtained before redirecting the user.
#[derive(Debug, Clone)]
pub struct RequestToken {
    pub token: String,
    pub secret: SecretString,
    pub callback_confirmed: bool,
}

/// Long-lived credential returned after a successful exchange.
#[derive(Debug, Clone)]
pub enum AccessToken {
    OAuth1(OAuth1Token),
    OAuth2(OAuth2Token),
}

impl AccessToken {
    pub fn protocol_version(&self) -> ProtocolVersion {
        match self {
            AccessToken::OAuth1(_) => ProtocolVersion::OAuth1,
            AccessToken::OAuth2(_) => ProtocolVersion::OAuth2,
        }
    }

    /// The token used to authenticate subsequent requests.
    pub fn access_token(&self) -> &SecretString {
        match self {
            AccessToken::OAuth1(token) => &token.token,
            AccessToken::OAuth2(token) => &token.access_token,
        }
    }

    /// Convert into the plain representation written to the session store.
    pub fn into_plain(self) -> PlainAccessToken {
        match self {
            AccessToken::OAuth1(token) => PlainAccessToken::OAuth1 {
                token: token.token.expose_secret().to_string(),
                secret: token.secret.expose_secret().to_string(),
                extra_params: token.extra_params,
            },
            AccessToken::OAuth2(token) => PlainAccessToken::OAuth2 {
                access_token: token.access_token.expose_secret().to_string(),
                refresh_token: token
                    .refresh_token
                    .map(|rt| rt.expose_secret().to_string()),
                expires_at: token.expires_at,
                token_type: token.token_type,
                scopes: token.scopes,
            },
        }
    }
}

/// Session representation of an [`AccessToken`], with secrets exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "protocol")]
pub enum PlainAccessToken {
    #[serde(rename = "oauth1")]
    OAuth1 {
        token: String,
        secret: String,
        #[serde(default)]
        extra_params: BTreeMap<String, String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        access_token: String,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
        token_type: String,
        #[serde(default)]
        scopes: Vec<String>,
    },
}

impl From<PlainAccessToken> for AccessToken {
    fn from(plain: PlainAccessToken) -> Self {
        match plain {
            PlainAccessToken::OAuth1 {
                token,
                secret,
                extra_params,
            } => AccessToken::OAuth1(OAuth1Token {
                token: SecretString::from(token),
                secret: SecretString::from(secret),
                extra_params,
            }),
            PlainAccessToken::OAuth2 {
                access_token,
                refresh_token,
                expires_at,
                token_type,
                scopes,
            } => AccessToken::OAuth2(OAuth2Token {
                access_token: SecretString::from(access_token),
                refresh_token: refresh_token.map(SecretString::from),
                expires_at,
                token_type,
                scopes,
            }),
        }
    }
}

/// Session representation of a pending [`RequestToken`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlainRequestToken {
    pub token: String,
    pub secret: String,
    #[serde(default)]
    pub callback_confirmed: bool,
}

impl From<&RequestToken> for PlainRequestToken {
    fn from(request_token: &RequestToken) -> Self {
        Self {
            token: request_token.token.clone(),
            secret: request_token.secret.expose_secret().to_string(),
            callback_confirmed: request_token.callback_confirmed,
        }
    }
}

impl From<PlainRequestToken> for RequestToken {
    fn from(plain: PlainRequestToken) -> Self {
        Self {
            token: plain.token,
            secret: SecretString::from(plain.secret),
            callback_confirmed: plain.callback_confirmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn oauth2_token(expires_at: Option<DateTime<Utc>>) -> OAuth2Token {
        OAuth2Token {
            access_token: SecretString::from("test".to_string()),
            refresh_token: None,
            expires_at,
            token_type: "Bearer".to_string(),
            scopes: vec![],
        }
    }

    #[test]
    fn test_token_not_expired() {
        let tokens = oauth2_token(Some(Utc::now() + Duration::hours(1)));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn test_token_expired() {
        let tokens = oauth2_token(Some(Utc::now() - Duration::hours(1)));
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_token_expiring_soon() {
        let tokens = oauth2_token(Some(Utc::now() + Duration::minutes(3)));
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        let tokens = oauth2_token(None);
        assert!(!tokens.is_expired());
    }

    #[test]
    fn test_plain_oauth1_token_is_tagged() {
        let token = AccessToken::OAuth1(OAuth1Token {
            token: SecretString::from("tok".to_string()),
            secret: SecretString::from("sec".to_string()),
            extra_params: BTreeMap::from([("screen_name".to_string(), "rustacean".to_string())]),
        });

        let value = serde_json::to_value(token.into_plain()).unwrap();
        assert_eq!(value["protocol"], "oauth1");
        assert_eq!(value["token"], "tok");
        assert_eq!(value["extra_params"]["screen_name"], "rustacean");

        let restored: PlainAccessToken = serde_json::from_value(value).unwrap();
        let restored = AccessToken::from(restored);
        assert_eq!(restored.protocol_version(), ProtocolVersion::OAuth1);
        assert_eq!(restored.access_token().expose_secret(), "tok");
    }
}

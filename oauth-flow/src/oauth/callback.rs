//! Query parameters a provider sends back to the callback endpoint.

use serde::Deserialize;

/// Callback query parameters for both protocol versions.
///
/// OAuth2 providers send `code`, `state`, `error` and `error_description`;
/// OAuth1 providers send `oauth_token`, `oauth_verifier` and `denied`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
    pub denied: Option<String>,
}

impl CallbackParams {
    /// The OAuth2 `error` parameter, when present and non-empty.
    pub fn error(&self) -> Option<&str> {
        non_empty(&self.error)
    }

    /// Message describing an OAuth2 error: `error_description` if present, else `error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error()
            .map(|error| non_empty(&self.error_description).unwrap_or(error))
    }

    pub fn code(&self) -> Option<&str> {
        non_empty(&self.code)
    }

    pub fn state(&self) -> Option<&str> {
        non_empty(&self.state)
    }

    pub fn oauth_token(&self) -> Option<&str> {
        non_empty(&self.oauth_token)
    }

    pub fn oauth_verifier(&self) -> Option<&str> {
        non_empty(&self.oauth_verifier)
    }

    /// Whether an OAuth1 provider reported that the user declined.
    pub fn is_denied(&self) -> bool {
        self.denied.is_some() || self.oauth_token.as_deref() == Some("denied")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

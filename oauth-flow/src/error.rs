//! Error types for the `oauth-flow` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding an
//! error kind tree and an optional source carrying the human readable message.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the oauth-flow crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth-flow.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The provider name is not registered as an OAuth1 or OAuth2 service.
    ServiceNotSupported,
    /// The user declined the authorization request at the provider.
    UserDenied,
    OAuth(OAuthErrorKind),
    Session(SessionErrorKind),
    Config(ConfigErrorKind),
    Http(HttpErrorKind),
}

/// Errors from the authorization dance itself.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// The provider answered the callback with an `error` parameter.
    ProviderError,
    MissingToken,
    MissingCode,
    RequestTokenFailed,
    TokenExchangeFailed,
    InvalidState,
    InvalidResponse,
}

/// Errors from the session-backed token/state store.
#[derive(Debug, PartialEq)]
pub enum SessionErrorKind {
    Read,
    Write,
    Serialization,
}

/// Errors from provider configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    MissingCredentials,
    InvalidUrl,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
    Timeout,
}

impl Error {
    /// True when the error is one of the generic OAuth failures.
    pub fn is_oauth(&self) -> bool {
        matches!(self.error_kind, ErrorKind::OAuth(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::ServiceNotSupported => write!(f, "Service not supported")?,
            ErrorKind::UserDenied => write!(f, "User denied")?,
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind)?,
            ErrorKind::Session(kind) => write!(f, "Session error: {:?}", kind)?,
            ErrorKind::Config(kind) => write!(f, "Configuration error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_timeout() {
            ErrorKind::Http(HttpErrorKind::Timeout)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Session(SessionErrorKind::Serialization),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Config(ConfigErrorKind::InvalidUrl),
        }
    }
}

/// Helper function to create the error for an unknown provider.
pub fn service_not_supported(provider: &str) -> Error {
    Error {
        source: Some(
            format!(
                "{} is not a supported OAuth1 or OAuth2 service provider",
                provider
            )
            .into(),
        ),
        error_kind: ErrorKind::ServiceNotSupported,
    }
}

/// Helper function to create user denied errors.
pub fn user_denied(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::UserDenied,
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create session errors.
pub fn session_error(kind: SessionErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Session(kind),
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create HTTP errors.
pub fn http_error(kind: HttpErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Http(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = oauth_error(OAuthErrorKind::ProviderError, "redirect_uri_mismatch");
        assert_eq!(
            err.to_string(),
            "OAuth error: ProviderError: redirect_uri_mismatch"
        );
    }

    #[test]
    fn test_service_not_supported_message() {
        let err = service_not_supported("myspace");
        assert_eq!(err.error_kind, ErrorKind::ServiceNotSupported);
        assert!(err
            .to_string()
            .contains("myspace is not a supported OAuth1 or OAuth2 service provider"));
    }

    #[test]
    fn test_is_oauth() {
        assert!(oauth_error(OAuthErrorKind::MissingToken, "x").is_oauth());
        assert!(!user_denied("x").is_oauth());
    }
}

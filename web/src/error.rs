use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use oauth_flow::error::{Error as FlowError, ErrorKind, OAuthErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(FlowError);

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            ErrorKind::ServiceNotSupported => StatusCode::NOT_FOUND,
            ErrorKind::UserDenied => StatusCode::FORBIDDEN,
            ErrorKind::OAuth(oauth_error_kind) => match oauth_error_kind {
                OAuthErrorKind::RequestTokenFailed | OAuthErrorKind::TokenExchangeFailed => {
                    StatusCode::BAD_GATEWAY
                }
                OAuthErrorKind::ProviderError
                | OAuthErrorKind::MissingToken
                | OAuthErrorKind::MissingCode
                | OAuthErrorKind::InvalidState
                | OAuthErrorKind::InvalidResponse => StatusCode::BAD_REQUEST,
            },
            ErrorKind::Http(_) => StatusCode::BAD_GATEWAY,
            ErrorKind::Session(_) | ErrorKind::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self.0);
        } else {
            warn!("{}", self.0);
        }

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
            status => (status, self.0.to_string()).into_response(),
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<FlowError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth_flow::error::{
        config_error, http_error, oauth_error, service_not_supported, session_error, user_denied,
        ConfigErrorKind, HttpErrorKind, SessionErrorKind,
    };

    fn status(err: FlowError) -> StatusCode {
        Error::from(err).into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status(service_not_supported("myspace")), StatusCode::NOT_FOUND);
        assert_eq!(status(user_denied("no")), StatusCode::FORBIDDEN);
        assert_eq!(
            status(oauth_error(OAuthErrorKind::ProviderError, "invalid_scope")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(oauth_error(OAuthErrorKind::InvalidState, "bad state")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(oauth_error(OAuthErrorKind::MissingToken, "OAuth token not found")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(oauth_error(OAuthErrorKind::TokenExchangeFailed, "bad code")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(http_error(HttpErrorKind::Timeout, "timed out")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(session_error(SessionErrorKind::Write, "store down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(config_error(ConfigErrorKind::MissingCredentials, "none")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

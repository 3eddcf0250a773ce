//! OAuth 1.0a provider client: HMAC-SHA1 signing via `oauth1-request`, transport via reqwest.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::token::{OAuth1Token, RequestToken};
use crate::oauth::{Credentials, OAuth1Service};

/// The three endpoints of an OAuth 1.0a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub request_token_url: String,
    pub authorization_url: String,
    pub access_token_url: String,
}

impl Endpoints {
    pub fn new(
        request_token_url: impl Into<String>,
        authorization_url: impl Into<String>,
        access_token_url: impl Into<String>,
    ) -> Self {
        Self {
            request_token_url: request_token_url.into(),
            authorization_url: authorization_url.into(),
            access_token_url: access_token_url.into(),
        }
    }
}

/// OAuth 1.0a client.
pub struct Client {
    credentials: Credentials,
    endpoints: Endpoints,
    http: reqwest::Client,
}

impl Client {
    pub fn new(credentials: Credentials, endpoints: Endpoints, http: reqwest::Client) -> Self {
        Self {
            credentials,
            endpoints,
            http,
        }
    }

    fn consumer(&self) -> oauth1_request::Credentials<&str> {
        oauth1_request::Credentials::new(
            self.credentials.client_id.as_str(),
            self.credentials.client_secret.expose_secret().as_str(),
        )
    }

    /// POST to a token endpoint with a signed `Authorization` header and
    /// decode the form-encoded response body.
    async fn post_signed(
        &self,
        url: &str,
        authorization: String,
        failure: OAuthErrorKind,
    ) -> Result<HashMap<String, String>, Error> {
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("{} returned {}: {}", url, status, body.trim());
            return Err(oauth_error(
                failure,
                &format!("{} returned {}: {}", url, status, body.trim()),
            ));
        }

        Ok(url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect())
    }
}

fn required(
    params: &mut HashMap<String, String>,
    name: &str,
    failure: OAuthErrorKind,
) -> Result<String, Error> {
    params
        .remove(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| oauth_error(failure, &format!("Response is missing {}", name)))
}

#[async_trait]
impl OAuth1Service for Client {
    async fn request_request_token(&self) -> Result<RequestToken, Error> {
        debug!(
            "Requesting OAuth1 request token from {}",
            self.endpoints.request_token_url
        );

        let authorization =
            oauth1_request::Builder::<_, _>::new(self.consumer(), oauth1_request::HmacSha1::new())
                .callback(self.credentials.callback_url.as_str())
                .post(&self.endpoints.request_token_url, &());

        let mut params = self
            .post_signed(
                &self.endpoints.request_token_url,
                authorization,
                OAuthErrorKind::RequestTokenFailed,
            )
            .await?;

        let token = required(&mut params, "oauth_token", OAuthErrorKind::RequestTokenFailed)?;
        let secret = required(
            &mut params,
            "oauth_token_secret",
            OAuthErrorKind::RequestTokenFailed,
        )?;
        let callback_confirmed =
            params.get("oauth_callback_confirmed").map(String::as_str) == Some("true");
        if !callback_confirmed {
            warn!("Provider did not confirm the OAuth1 callback URL");
        }

        Ok(RequestToken {
            token,
            secret: SecretString::from(secret),
            callback_confirmed,
        })
    }

    fn authorization_uri(&self, request_token: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.endpoints.authorization_url)?;
        url.query_pairs_mut()
            .append_pair("oauth_token", request_token);
        Ok(url)
    }

    async fn request_access_token(
        &self,
        token: &str,
        verifier: Option<&str>,
        token_secret: &SecretString,
    ) -> Result<OAuth1Token, Error> {
        debug!(
            "Exchanging OAuth1 request token at {}",
            self.endpoints.access_token_url
        );

        let mut builder =
            oauth1_request::Builder::<_, _>::new(self.consumer(), oauth1_request::HmacSha1::new());
        builder.token(oauth1_request::Credentials::new(
            token,
            token_secret.expose_secret().as_str(),
        ));
        if let Some(verifier) = verifier {
            builder.verifier(verifier);
        }
        let authorization = builder.post(&self.endpoints.access_token_url, &());

        let mut params = self
            .post_signed(
                &self.endpoints.access_token_url,
                authorization,
                OAuthErrorKind::TokenExchangeFailed,
            )
            .await?;

        let token = required(&mut params, "oauth_token", OAuthErrorKind::TokenExchangeFailed)?;
        let secret = required(
            &mut params,
            "oauth_token_secret",
            OAuthErrorKind::TokenExchangeFailed,
        )?;

        Ok(OAuth1Token {
            token: SecretString::from(token),
            secret: SecretString::from(secret),
            extra_params: params.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, HttpErrorKind};
    use crate::http::HttpClientBuilder;
    use mockito::Matcher;
    use std::time::Duration;

    fn client(base: &str) -> Client {
        client_with(base, reqwest::Client::new())
    }

    fn client_with(base: &str, http: reqwest::Client) -> Client {
        let credentials = Credentials {
            client_id: "consumer-key".to_string(),
            client_secret: SecretString::from("consumer-secret".to_string()),
            callback_url: Url::parse("http://localhost:4000/oauth/twitter").unwrap(),
        };
        let endpoints = Endpoints::new(
            format!("{}/oauth/request_token", base),
            "https://api.twitter.com/oauth/authenticate",
            format!("{}/oauth/access_token", base),
        );
        Client::new(credentials, endpoints, http)
    }

    #[tokio::test]
    async fn test_request_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/request_token")
            .match_header(
                "authorization",
                Matcher::AllOf(vec![
                    Matcher::Regex("^OAuth ".to_string()),
                    Matcher::Regex("oauth_callback=".to_string()),
                    Matcher::Regex(r#"oauth_consumer_key="consumer-key""#.to_string()),
                    Matcher::Regex(r#"oauth_signature_method="HMAC-SHA1""#.to_string()),
                ]),
            )
            .with_status(200)
            .with_body("oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true")
            .create_async()
            .await;

        let token = client(&server.url()).request_request_token().await.unwrap();

        mock.assert_async().await;
        assert_eq!(token.token, "req-token");
        assert_eq!(token.secret.expose_secret(), "req-secret");
        assert!(token.callback_confirmed);
    }

    #[tokio::test]
    async fn test_request_token_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/request_token")
            .with_status(401)
            .with_body("Invalid consumer key")
            .create_async()
            .await;

        let err = client(&server.url())
            .request_request_token()
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::RequestTokenFailed)
        );
        assert!(err.to_string().contains("Invalid consumer key"));
    }

    #[tokio::test]
    async fn test_request_token_missing_secret() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/request_token")
            .with_status(200)
            .with_body("oauth_token=req-token")
            .create_async()
            .await;

        let err = client(&server.url())
            .request_request_token()
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::RequestTokenFailed)
        );
    }

    #[test]
    fn test_authorization_uri() {
        let url = client("http://localhost:1")
            .authorization_uri("req-token")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twitter.com/oauth/authenticate?oauth_token=req-token"
        );
    }

    #[tokio::test]
    async fn test_access_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/access_token")
            .match_header(
                "authorization",
                Matcher::AllOf(vec![
                    Matcher::Regex(r#"oauth_token="req-token""#.to_string()),
                    Matcher::Regex(r#"oauth_verifier="verifier-1""#.to_string()),
                ]),
            )
            .with_status(200)
            .with_body("oauth_token=access-token&oauth_token_secret=access-secret&screen_name=rustacean&user_id=42")
            .create_async()
            .await;

        let token = client(&server.url())
            .request_access_token(
                "req-token",
                Some("verifier-1"),
                &SecretString::from("req-secret".to_string()),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(token.token.expose_secret(), "access-token");
        assert_eq!(token.secret.expose_secret(), "access-secret");
        assert_eq!(
            token.extra_params.get("screen_name").map(String::as_str),
            Some("rustacean")
        );
        assert_eq!(
            token.extra_params.get("user_id").map(String::as_str),
            Some("42")
        );
        assert!(!token.extra_params.contains_key("oauth_token"));
    }

    #[tokio::test]
    async fn test_access_token_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/access_token")
            .with_status(401)
            .with_body("Invalid request token")
            .create_async()
            .await;

        let err = client(&server.url())
            .request_access_token(
                "stale",
                Some("verifier"),
                &SecretString::from("secret".to_string()),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
    }

    #[tokio::test]
    async fn test_request_token_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/request_token")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(std::time::Duration::from_secs(1));
                w.write_all(b"oauth_token=late&oauth_token_secret=late")
            })
            .expect_at_most(1)
            .create_async()
            .await;

        let http = HttpClientBuilder::new()
            .with_timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let err = client_with(&server.url(), http)
            .request_request_token()
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Http(HttpErrorKind::Timeout));
    }
}

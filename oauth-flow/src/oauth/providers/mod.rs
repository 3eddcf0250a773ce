//! Concrete provider clients and the catalog of well-known provider endpoints.

pub mod v1;
pub mod v2;

use super::provider::{OAuth1Service, OAuth2Service};
use super::registry::Registry;
use crate::error::Error;
use crate::http::HttpClientBuilder;

/// OAuth 2.0 providers: name, authorization URL, token URL.
const OAUTH2_PROVIDERS: &[(&str, &str, &str)] = &[
    (
        "github",
        "https://github.com/login/oauth/authorize",
        "https://github.com/login/oauth/access_token",
    ),
    (
        "google",
        "https://accounts.google.com/o/oauth2/v2/auth",
        "https://oauth2.googleapis.com/token",
    ),
    (
        "facebook",
        "https://www.facebook.com/dialog/oauth",
        "https://graph.facebook.com/oauth/access_token",
    ),
    (
        "linkedin",
        "https://www.linkedin.com/oauth/v2/authorization",
        "https://www.linkedin.com/oauth/v2/accessToken",
    ),
    (
        "microsoft",
        "https://login.live.com/oauth20_authorize.srf",
        "https://login.live.com/oauth20_token.srf",
    ),
    (
        "dropbox",
        "https://www.dropbox.com/oauth2/authorize",
        "https://api.dropboxapi.com/oauth2/token",
    ),
    (
        "instagram",
        "https://api.instagram.com/oauth/authorize",
        "https://api.instagram.com/oauth/access_token",
    ),
];

/// OAuth 1.0a providers: name, request token URL, authorization URL, access token URL.
const OAUTH1_PROVIDERS: &[(&str, &str, &str, &str)] = &[
    (
        "twitter",
        "https://api.twitter.com/oauth/request_token",
        "https://api.twitter.com/oauth/authenticate",
        "https://api.twitter.com/oauth/access_token",
    ),
    (
        "tumblr",
        "https://www.tumblr.com/oauth/request_token",
        "https://www.tumblr.com/oauth/authorize",
        "https://www.tumblr.com/oauth/access_token",
    ),
    (
        "flickr",
        "https://www.flickr.com/services/oauth/request_token",
        "https://www.flickr.com/services/oauth/authorize",
        "https://www.flickr.com/services/oauth/access_token",
    ),
    (
        "etsy",
        "https://openapi.etsy.com/v2/oauth/request_token",
        "https://www.etsy.com/oauth/signin",
        "https://openapi.etsy.com/v2/oauth/access_token",
    ),
    (
        "bitbucket",
        "https://bitbucket.org/api/1.0/oauth/request_token",
        "https://bitbucket.org/api/1.0/oauth/authenticate",
        "https://bitbucket.org/api/1.0/oauth/access_token",
    ),
];

/// Register every catalog provider on `registry`.
///
/// OAuth1 clients share one reqwest client built from `http`; OAuth2 clients use
/// the configured timeout around the code exchange.
pub fn register_defaults(registry: &mut Registry, http: &HttpClientBuilder) -> Result<(), Error> {
    let client = http.build()?;
    let timeout = http.config().timeout;

    for (name, authorization_url, token_url) in OAUTH2_PROVIDERS {
        let endpoints = v2::Endpoints::new(*authorization_url, *token_url);
        registry.register_oauth2(name, move |credentials, scopes| {
            let service = v2::Client::new(credentials, scopes, &endpoints, timeout)?;
            Ok(Box::new(service) as Box<dyn OAuth2Service>)
        });
    }

    for (name, request_token_url, authorization_url, access_token_url) in OAUTH1_PROVIDERS {
        let endpoints =
            v1::Endpoints::new(*request_token_url, *authorization_url, *access_token_url);
        let client = client.clone();
        registry.register_oauth1(name, move |credentials| {
            let service = v1::Client::new(credentials, endpoints.clone(), client.clone());
            Ok(Box::new(service) as Box<dyn OAuth1Service>)
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::{Credentials, ProtocolVersion, Service};
    use secrecy::SecretString;
    use url::Url;

    fn credentials(provider: &str) -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: SecretString::from("secret".to_string()),
            callback_url: Url::parse(&format!("http://localhost:4000/oauth/{}", provider))
                .unwrap(),
        }
    }

    #[test]
    fn test_default_catalog_classification() {
        let registry = Registry::with_default_providers(&HttpClientBuilder::new()).unwrap();

        for name in ["github", "google", "facebook", "linkedin", "microsoft", "dropbox", "instagram"] {
            assert!(registry.is_oauth2(name), "{} should be OAuth2", name);
        }
        for name in ["twitter", "tumblr", "flickr", "etsy", "bitbucket"] {
            assert!(registry.is_oauth1(name), "{} should be OAuth1", name);
        }
        assert_eq!(registry.names().len(), 12);
    }

    #[test]
    fn test_default_catalog_builds_clients() {
        let registry = Registry::with_default_providers(&HttpClientBuilder::new()).unwrap();

        let service = registry
            .create("google", credentials("google"), vec!["email".to_string()])
            .unwrap();
        match service {
            Service::OAuth2(client) => {
                let url = client.authorization_uri("s").unwrap();
                assert_eq!(url.host_str(), Some("accounts.google.com"));
            }
            Service::OAuth1(_) => panic!("google should be OAuth2"),
        }

        let service = registry
            .create("twitter", credentials("twitter"), vec![])
            .unwrap();
        assert_eq!(service.protocol_version(), ProtocolVersion::OAuth1);
    }
}

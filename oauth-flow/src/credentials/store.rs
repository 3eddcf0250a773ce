//! Credential store trait and its configuration-backed implementation.

use std::collections::HashMap;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::error::{config_error, ConfigErrorKind, Error};
use crate::oauth::{normalize, Credentials};

/// Path segment under which provider callbacks are served.
const CALLBACK_PATH: &str = "oauth";

/// Per-provider configuration: `key`, `secret` and a comma separated `scope`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub key: String,
    pub secret: SecretString,
    #[serde(default)]
    pub scope: Option<String>,
}

impl ProviderSettings {
    pub fn new(key: String, secret: String, scope: Option<String>) -> Self {
        Self {
            key,
            secret: SecretString::from(secret),
            scope,
        }
    }
}

/// Trait for looking up provider credentials and default scopes.
pub trait CredentialStore: Send + Sync {
    /// Build the client credentials for `provider`.
    fn credentials(&self, provider: &str) -> Result<Credentials, Error>;

    /// The configured default scopes for `provider`, in configuration order.
    fn scopes(&self, provider: &str) -> Vec<String>;
}

/// Split a comma separated scope list, trimming each entry and dropping empty ones.
pub fn parse_scopes(scope: &str) -> Vec<String> {
    scope
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Credential store backed by loaded configuration.
#[derive(Debug, Clone)]
pub struct ConfigCredentialStore {
    base_url: Url,
    providers: HashMap<String, ProviderSettings>,
}

impl ConfigCredentialStore {
    /// Create a credential store.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Public URL of the application; callbacks are `{base_url}/oauth/{provider}`
    /// * `providers` - Settings keyed by provider name
    pub fn new(base_url: Url, providers: HashMap<String, ProviderSettings>) -> Self {
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let providers = providers
            .into_iter()
            .map(|(name, settings)| (normalize(&name), settings))
            .collect();

        Self {
            base_url,
            providers,
        }
    }

    /// The callback URL for `provider`.
    pub fn callback_url(&self, provider: &str) -> Result<Url, Error> {
        Ok(self
            .base_url
            .join(&format!("{}/{}", CALLBACK_PATH, normalize(provider)))?)
    }

    pub fn settings(&self, provider: &str) -> Option<&ProviderSettings> {
        self.providers.get(&normalize(provider))
    }
}

impl CredentialStore for ConfigCredentialStore {
    fn credentials(&self, provider: &str) -> Result<Credentials, Error> {
        let settings = self.settings(provider).ok_or_else(|| {
            config_error(
                ConfigErrorKind::MissingCredentials,
                &format!("No credentials configured for {}", provider),
            )
        })?;

        Ok(Credentials {
            client_id: settings.key.clone(),
            client_secret: settings.secret.clone(),
            callback_url: self.callback_url(provider)?,
        })
    }

    fn scopes(&self, provider: &str) -> Vec<String> {
        self.settings(provider)
            .and_then(|settings| settings.scope.as_deref())
            .map(parse_scopes)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use secrecy::ExposeSecret;

    fn store(base_url: &str) -> ConfigCredentialStore {
        let mut providers = HashMap::new();
        providers.insert(
            "GitHub".to_string(),
            ProviderSettings {
                key: "client-id".to_string(),
                secret: SecretString::from("client-secret".to_string()),
                scope: Some("repo, user".to_string()),
            },
        );
        ConfigCredentialStore::new(Url::parse(base_url).unwrap(), providers)
    }

    #[test]
    fn test_parse_scopes_trims_entries() {
        assert_eq!(parse_scopes("repo, user"), vec!["repo", "user"]);
        assert_eq!(parse_scopes(" email ,,profile "), vec!["email", "profile"]);
        assert!(parse_scopes("").is_empty());
    }

    #[test]
    fn test_scopes_from_configuration() {
        let store = store("http://localhost:4000");
        assert_eq!(store.scopes("github"), vec!["repo", "user"]);
        assert!(store.scopes("twitter").is_empty());
    }

    #[test]
    fn test_credentials_include_callback_url() {
        let store = store("http://localhost:4000");
        let credentials = store.credentials("github").unwrap();

        assert_eq!(credentials.client_id, "client-id");
        assert_eq!(credentials.client_secret.expose_secret(), "client-secret");
        assert_eq!(
            credentials.callback_url.as_str(),
            "http://localhost:4000/oauth/github"
        );
    }

    #[test]
    fn test_callback_url_keeps_base_path() {
        let store = store("https://example.com/app");
        assert_eq!(
            store.callback_url("github").unwrap().as_str(),
            "https://example.com/app/oauth/github"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let err = store("http://localhost:4000")
            .credentials("twitter")
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::MissingCredentials)
        );
    }

    #[test]
    fn test_settings_deserialize_from_json() {
        let settings: ProviderSettings = serde_json::from_value(serde_json::json!({
            "key": "k",
            "secret": "s"
        }))
        .unwrap();
        assert_eq!(settings.key, "k");
        assert!(settings.scope.is_none());
    }
}

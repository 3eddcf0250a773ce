//! Provider credentials loaded from a TOML file, one table per provider:
//!
//! ```toml
//! [github]
//! key = "client-id"
//! secret = "client-secret"
//! scope = "repo, user"
//! ```

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use log::*;
use serde::Deserialize;

/// Credentials and default scopes for one provider.
#[derive(Clone, Deserialize, PartialEq)]
pub struct ProviderConfig {
    pub key: String,
    pub secret: String,
    /// Comma separated default scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

pub type ProvidersConfig = BTreeMap<String, ProviderConfig>;

#[derive(Debug)]
pub enum ProvidersConfigError {
    NotFound(PathBuf),
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ProvidersConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvidersConfigError::NotFound(path) => {
                write!(f, "Provider configuration not found: {}", path.display())
            }
            ProvidersConfigError::Io(err) => write!(f, "Failed to read provider configuration: {err}"),
            ProvidersConfigError::Parse(err) => {
                write!(f, "Invalid provider configuration: {err}")
            }
        }
    }
}

impl StdError for ProvidersConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProvidersConfigError::NotFound(_) => None,
            ProvidersConfigError::Io(err) => Some(err),
            ProvidersConfigError::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ProvidersConfigError {
    fn from(err: std::io::Error) -> Self {
        ProvidersConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ProvidersConfigError {
    fn from(err: toml::de::Error) -> Self {
        ProvidersConfigError::Parse(err)
    }
}

/// Read and parse the provider configuration file at `path`.
pub fn load_providers(path: &Path) -> Result<ProvidersConfig, ProvidersConfigError> {
    if !path.exists() {
        return Err(ProvidersConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let providers = parse_providers(&content)?;

    info!(
        "Loaded credentials for {} provider(s) from {}",
        providers.len(),
        path.display()
    );

    Ok(providers)
}

/// Parse provider configuration; table names are lower-cased.
pub fn parse_providers(content: &str) -> Result<ProvidersConfig, ProvidersConfigError> {
    let providers: ProvidersConfig = toml::from_str(content)?;

    Ok(providers
        .into_iter()
        .map(|(name, provider)| (name.to_lowercase(), provider))
        .collect())
}

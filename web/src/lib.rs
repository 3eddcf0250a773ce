use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use log::*;
use oauth_flow::credentials::{ConfigCredentialStore, CredentialStore, ProviderSettings};
use oauth_flow::http::HttpClientBuilder;
use oauth_flow::oauth::{OAuth, Registry};
use service::config::Config;
use service::providers::ProvidersConfig;
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use url::Url;

pub use self::error::{Error, Result};
pub use self::session::TowerSession;

mod controller;
mod error;
pub mod router;
pub mod session;

// Application state shared by all handlers.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    registry: Arc<Registry>,
    credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Registry,
        credentials: impl CredentialStore + 'static,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            credentials: Arc::new(credentials),
        }
    }

    /// Build the state from configuration: the built-in provider catalog plus
    /// credentials from the loaded provider file.
    pub fn from_config(
        config: Config,
        providers: ProvidersConfig,
    ) -> core::result::Result<Self, oauth_flow::Error> {
        let mut http = HttpClientBuilder::new().with_timeout(config.http_timeout());
        if let Some(user_agent) = config.user_agent() {
            http = http.with_user_agent(user_agent);
        }
        let registry = Registry::with_default_providers(&http)?;

        for name in providers.keys() {
            if !registry.service_exists(name) {
                warn!("Credentials configured for unsupported provider {name}");
            }
        }

        let base_url = Url::parse(config.base_url())?;
        let providers = providers
            .into_iter()
            .map(|(name, provider)| {
                (
                    name,
                    ProviderSettings::new(provider.key, provider.secret, provider.scope),
                )
            })
            .collect();
        let credentials = ConfigCredentialStore::new(base_url, providers);

        Ok(Self::new(config, registry, credentials))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The authorization flow bound to the request's session.
    pub fn oauth(&self, session: Session) -> OAuth<TowerSession> {
        OAuth::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.credentials),
            TowerSession::new(session),
        )
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    info!(
        "Starting server in {} mode with {} provider(s): {:?}",
        app_state.config.runtime_env(),
        app_state.registry().names().len(),
        app_state.registry()
    );

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(app_state.config.is_production())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            app_state.config.backend_session_expiry_seconds as i64,
        )));

    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .allow_origin(allowed_origins);

    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", interface, app_state.config.port);
    let listener = tokio::net::TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    let app = router::define_routes(app_state)
        .layer(session_layer)
        .layer(cors_layer);

    axum::serve(listener, app).await
}

use crate::controller::{health_check_controller, oauth_controller};
use crate::AppState;
use axum::{routing::get, Router};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "OAuth Bridge API"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::login,
            oauth_controller::callback,
            oauth_controller::token_status,
            oauth_controller::forget_token,
        ),
        components(
            schemas(
                oauth_controller::TokenStatus,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "oauth_bridge", description = "OAuth1 and OAuth2 login flows")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Tokens and pending flow state live in the cookie session.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value set on the first login request via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/oauth/{provider}", get(oauth_controller::callback))
        .route("/oauth/{provider}/login", get(oauth_controller::login))
        .route(
            "/oauth/{provider}/token",
            get(oauth_controller::token_status).delete(oauth_controller::forget_token),
        )
        .with_state(app_state)
}

//! Controller for the OAuth login, callback and token endpoints.
//!
//! Login and callback are reached through browser redirects, so they take all
//! input from the path and query string.

use crate::{AppState, Error};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use log::*;
use oauth_flow::error::service_not_supported;
use oauth_flow::oauth::{normalize, CallbackParams};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for starting a login
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginParams {
    /// Where to send the user after the callback has been handled
    pub redirect: Option<String>,
    /// Comma separated scopes overriding the configured defaults
    pub scope: Option<String>,
}

/// Whether the current session holds an access token for a provider.
#[derive(Debug, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct TokenStatus {
    pub provider: String,
    pub connected: bool,
}

/// Only same-site absolute paths are followed after login.
fn is_local_path(redirect: &str) -> bool {
    redirect.starts_with('/') && !redirect.starts_with("//") && !redirect.contains('\\')
}

/// GET /oauth/{provider}/login
///
/// Redirects the user to the provider's authorization endpoint.
#[utoipa::path(
    get,
    path = "/oauth/{provider}/login",
    params(
        ("provider" = String, Path, description = "Provider name, e.g. github or twitter"),
        LoginParams,
    ),
    responses(
        (status = 307, description = "Redirect to the provider's authorization endpoint"),
        (status = 404, description = "Provider is not supported"),
        (status = 500, description = "Provider credentials are not configured"),
        (status = 502, description = "Request token could not be obtained"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    Query(params): Query<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("Starting OAuth login for {provider}");

    let oauth = app_state.oauth(session);
    let url = oauth
        .authorization_uri(
            &provider,
            params.redirect.as_deref(),
            params.scope.as_deref(),
        )
        .await?;

    Ok(Redirect::temporary(url.as_str()))
}

/// GET /oauth/{provider}
///
/// Callback the provider redirects back to. Exchanges the grant for an access
/// token, stores it in the session and redirects to the path recorded in the
/// flow state.
#[utoipa::path(
    get,
    path = "/oauth/{provider}",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ("code" = Option<String>, Query, description = "OAuth2 authorization code"),
        ("state" = Option<String>, Query, description = "OAuth2 flow state"),
        ("error" = Option<String>, Query, description = "OAuth2 error code"),
        ("error_description" = Option<String>, Query, description = "OAuth2 error description"),
        ("oauth_token" = Option<String>, Query, description = "OAuth1 request token"),
        ("oauth_verifier" = Option<String>, Query, description = "OAuth1 verifier"),
        ("denied" = Option<String>, Query, description = "OAuth1 denial marker"),
    ),
    responses(
        (status = 307, description = "Redirect to the stored redirect or the default landing path"),
        (status = 400, description = "Invalid callback parameters or provider error"),
        (status = 403, description = "User denied the authorization request"),
        (status = 404, description = "Provider is not supported"),
        (status = 502, description = "Token exchange failed"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, Error> {
    let oauth = app_state.oauth(session);

    let redirect = oauth.redirect_from_state(&provider, &params).await?;
    oauth.request_access_token(&provider, &params).await?;

    let target = match redirect {
        Some(redirect) if is_local_path(&redirect) => redirect,
        Some(redirect) => {
            warn!("Ignoring non-local redirect after {provider} login: {redirect}");
            app_state.config.default_landing_path().to_string()
        }
        None => app_state.config.default_landing_path().to_string(),
    };

    info!("Completed {provider} login, redirecting to {target}");
    Ok(Redirect::temporary(&target))
}

/// GET /oauth/{provider}/token
///
/// Reports whether the session holds an access token for the provider.
#[utoipa::path(
    get,
    path = "/oauth/{provider}/token",
    params(
        ("provider" = String, Path, description = "Provider name"),
    ),
    responses(
        (status = 200, description = "Token status", body = TokenStatus),
        (status = 404, description = "Provider is not supported"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn token_status(
    State(app_state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, Error> {
    if !app_state.registry().service_exists(&provider) {
        return Err(service_not_supported(&provider).into());
    }

    let connected = app_state.oauth(session).has_token(&provider).await?;

    Ok(Json(TokenStatus {
        provider: normalize(&provider),
        connected,
    }))
}

/// DELETE /oauth/{provider}/token
///
/// Removes the provider's access token from the session.
#[utoipa::path(
    delete,
    path = "/oauth/{provider}/token",
    params(
        ("provider" = String, Path, description = "Provider name"),
    ),
    responses(
        (status = 204, description = "Token removed"),
        (status = 404, description = "Provider is not supported"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn forget_token(
    State(app_state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, Error> {
    if !app_state.registry().service_exists(&provider) {
        return Err(service_not_supported(&provider).into());
    }

    app_state.oauth(session).forget_token(&provider).await?;

    Ok(StatusCode::NO_CONTENT)
}

//! `SessionStore` backed by the request's `tower_sessions::Session`.

use async_trait::async_trait;
use oauth_flow::error::{session_error, Error, SessionErrorKind};
use oauth_flow::oauth::token::SessionStore;
use serde_json::Value;
use tower_sessions::Session;

#[derive(Clone, Debug)]
pub struct TowerSession(Session);

impl TowerSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

fn read_error(err: tower_sessions::session::Error) -> Error {
    session_error(SessionErrorKind::Read, &err.to_string())
}

fn write_error(err: tower_sessions::session::Error) -> Error {
    session_error(SessionErrorKind::Write, &err.to_string())
}

#[async_trait]
impl SessionStore for TowerSession {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        self.0.get::<Value>(key).await.map_err(read_error)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        self.0.insert(key, value).await.map_err(write_error)
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        self.0
            .remove::<Value>(key)
            .await
            .map(|_| ())
            .map_err(write_error)
    }
}

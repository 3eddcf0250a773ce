//! Access/request token types and the session store they are kept in.

mod session;
mod tokens;

pub use session::{access_token_key, request_token_key, state_key, MemorySession, SessionStore};
pub use tokens::{
    AccessToken, OAuth1Token, OAuth2Token, PlainAccessToken, PlainRequestToken, RequestToken,
};

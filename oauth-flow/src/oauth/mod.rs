//! OAuth 1.0a and 2.0 authorization flows.
//!
//! The [`OAuth`] orchestrator resolves a provider through the [`Registry`],
//! drives the redirect dance and keeps tokens in a [`token::SessionStore`].

mod callback;
mod flow;
mod provider;
mod registry;
mod state;

pub mod providers;
pub mod token;

pub use callback::CallbackParams;
pub use flow::{LoginDirective, OAuth};
pub use provider::{Credentials, OAuth1Service, OAuth2Service, ProtocolVersion, Service};
pub use registry::{normalize, Constructor, OAuth1Constructor, OAuth2Constructor, Registry};
pub use state::{decode_state, encode_state, FlowState};

//! Read-only provider credentials (client id, secret, scopes) and callback URLs.

mod store;

pub use store::{parse_scopes, ConfigCredentialStore, CredentialStore, ProviderSettings};

//! Flow state carried across the redirect to the provider and back.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Caller-defined payload preserved across the authorization redirect.
///
/// Serializes to `{ "redirect": string | null, ...extra }`. The `redirect` key
/// always belongs to the typed field; [`FlowState::insert`] refuses it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    /// Where to send the user once the callback has been handled.
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl FlowState {
    pub const REDIRECT_KEY: &'static str = "redirect";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redirect(redirect: impl Into<String>) -> Self {
        Self {
            redirect: Some(redirect.into()),
            extra: Map::new(),
        }
    }

    /// Add a caller-defined field. Returns `false`, leaving the state
    /// untouched, when `key` is the reserved `redirect` key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if key == Self::REDIRECT_KEY {
            return false;
        }
        self.extra.insert(key, value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Caller-defined fields, without `redirect`.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Encode state for transport in a URL query parameter: JSON, then base64.
pub fn encode_state(state: &FlowState) -> Result<String, Error> {
    let json = serde_json::to_vec(state)?;
    Ok(STANDARD.encode(json))
}

/// Decode a state parameter produced by [`encode_state`].
pub fn decode_state(encoded: &str) -> Result<FlowState, Error> {
    // A `+` that went through form decoding comes back as a space.
    let encoded = encoded.trim().replace(' ', "+");

    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| oauth_error(OAuthErrorKind::InvalidState, &e.to_string()))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| oauth_error(OAuthErrorKind::InvalidState, &e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_state_round_trip() {
        let mut state = FlowState::with_redirect("/dashboard");
        assert!(state.insert("tab", json!("billing")));
        assert!(state.insert("attempt", json!(2)));

        let encoded = encode_state(&state).unwrap();
        assert_eq!(decode_state(&encoded).unwrap(), state);
    }

    #[test]
    fn test_insert_refuses_redirect_key() {
        let mut state = FlowState::with_redirect("/a");
        assert!(!state.insert("redirect", json!("/b")));
        assert!(state.extra().is_empty());

        let encoded = encode_state(&state).unwrap();
        let decoded = decode_state(&encoded).unwrap();
        assert_eq!(decoded.redirect.as_deref(), Some("/a"));
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_state_round_trip_over_generated_extras() {
        let keys = ["redirect", "tab", "tenant", "a b", "é", "", "$ref", "nested"];
        let values = [
            Value::Null,
            json!(true),
            json!(0),
            json!(-17),
            json!(u64::MAX),
            json!(1.5),
            json!(""),
            json!("+/= ?&"),
            json!([1, "two", null]),
            json!({ "redirect": "/inner", "deep": { "list": [] } }),
        ];
        let redirects = [None, Some(""), Some("/"), Some("/settings?tab=a&b=c")];

        for (round, redirect) in redirects.iter().enumerate() {
            let mut state = FlowState {
                redirect: redirect.map(str::to_string),
                ..FlowState::default()
            };
            for (i, key) in keys.iter().enumerate() {
                let value = values[(i + round * 3) % values.len()].clone();
                state.insert(*key, value);

                let encoded = encode_state(&state).unwrap();
                assert_eq!(decode_state(&encoded).unwrap(), state, "state {state:?}");
            }
            assert_eq!(state.redirect.as_deref(), *redirect);
            assert_eq!(state.extra().len(), keys.len() - 1);
        }
    }

    #[test]
    fn test_empty_state_serializes_null_redirect() {
        let encoded = encode_state(&FlowState::new()).unwrap();
        let json: Value = serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(json, json!({ "redirect": null }));
    }

    #[test]
    fn test_decode_state_produced_elsewhere() {
        // base64 of {"redirect":"/home"}
        let state = decode_state("eyJyZWRpcmVjdCI6Ii9ob21lIn0=").unwrap();
        assert_eq!(state.redirect.as_deref(), Some("/home"));
        assert!(state.extra().is_empty());
    }

    #[test]
    fn test_decode_state_restores_plus_from_space() {
        let state = FlowState::with_redirect("/?>>>");
        let encoded = encode_state(&state).unwrap();
        assert!(encoded.contains('+'));

        let mangled = encoded.replace('+', " ");
        assert_eq!(decode_state(&mangled).unwrap(), state);
    }

    #[test]
    fn test_decode_invalid_state() {
        let err = decode_state("not base64!").unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidState));

        // valid base64, not a JSON object
        let err = decode_state(&STANDARD.encode("[1,2]")).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidState));
    }
}

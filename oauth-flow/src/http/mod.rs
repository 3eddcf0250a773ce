//! HTTP client used to reach provider token endpoints.

mod client;

pub use client::{HttpClientBuilder, HttpClientConfig};

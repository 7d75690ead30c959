//! Shared constants and utilities for the bingwebsearch crates.
//!
//! This crate is deliberately tiny so that the transport, configuration, and
//! client crates can all depend on it without pulling in anything heavy.
//!
//! # Overview
//!
//! - [`DEFAULT_ENDPOINT`]: the public Bing Web Search v7 endpoint
//! - [`SUBSCRIPTION_KEY_ENV`]: environment variable consulted for the API key
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! ```rust
//! use bingwebsearch_common::{DEFAULT_ENDPOINT, SUBSCRIPTION_KEY_ENV};
//!
//! assert!(DEFAULT_ENDPOINT.ends_with("/v7.0/search"));
//! assert_eq!(SUBSCRIPTION_KEY_ENV, "BING_SEARCH_V7_SUBSCRIPTION_KEY");
//! ```

pub mod observability;

/// Bing Web Search v7 endpoint used when no override is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

/// Environment variable holding the subscription key when none is passed explicitly.
pub const SUBSCRIPTION_KEY_ENV: &str = "BING_SEARCH_V7_SUBSCRIPTION_KEY";

/// Header carrying the subscription key. Never logged in clear text.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Default total request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

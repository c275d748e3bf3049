//! Process-wide request defaults.
//!
//! # Design
//! The fixed headers every request carries live in one read-only
//! `TransportDefaults` value, built once and shared through an `Arc`.
//! `RequestBuilder` receives it by injection instead of reading globals at
//! call sites, so a host can swap in overrides (for example loaded from
//! JSON) without touching the builder.

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

/// User-Agent sent when no override is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("soap-http-core/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml,text/xml;q=0.9,*/*;q=0.8";

static SHARED: LazyLock<Arc<TransportDefaults>> =
    LazyLock::new(|| Arc::new(TransportDefaults::default()));

/// Headers and options applied to every outbound request before caller
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportDefaults {
    pub user_agent: String,
    pub accept: String,
    pub accept_encoding: String,
    pub accept_charset: String,
    pub follow_redirects: bool,
}

impl Default for TransportDefaults {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_encoding: "none".to_string(),
            accept_charset: "utf-8".to_string(),
            follow_redirects: true,
        }
    }
}

impl TransportDefaults {
    /// The shared instance built from the compiled-in values.
    pub fn shared() -> Arc<TransportDefaults> {
        Arc::clone(&SHARED)
    }
}

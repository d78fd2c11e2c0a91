//! Client configuration

use std::{env, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Service root used when nothing else is configured.
pub const DEFAULT_API_ROOT: &str = "http://localhost:8080";

/// Environment variable overriding the service root.
pub const API_ROOT_ENV: &str = "BATTLESHIP_API_URL";

/// Environment variable overriding the request timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "BATTLESHIP_TIMEOUT_SECS";

/// Client configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the game service, without the `/api/game` suffix
    pub api_root: String,
    /// Upper bound on a single request, connect through body
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `BATTLESHIP_API_URL` and `BATTLESHIP_TIMEOUT_SECS` when
    /// they are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(API_ROOT_ENV).filter(|root| !root.trim().is_empty()) {
            config.api_root = root.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "ignoring invalid {}", TIMEOUT_ENV),
            }
        }
        config
    }

    /// Replace the service root.
    pub fn with_api_root(mut self, root: impl Into<String>) -> Self {
        self.api_root = root.into();
        self
    }

    /// Replace the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

//! Client configuration

use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/veterinary-assist";
pub const DEFAULT_GREETING: &str = "Hello! How can I assist you with your pet today?";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Delay between revealed characters
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(40);

/// Settings for a chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// URL the multipart turn is posted to
    pub endpoint: String,
    /// Whole-request timeout; expiry counts as a connection failure
    pub request_timeout: Duration,
    pub reveal_interval: Duration,
    /// Assistant message the log is seeded with
    pub greeting: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `VET_CHAT_*` variables, falling back to defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            endpoint: lookup("VET_CHAT_ENDPOINT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.endpoint),
            request_timeout: duration_or(
                &lookup,
                "VET_CHAT_REQUEST_TIMEOUT_SECS",
                Duration::from_secs,
                defaults.request_timeout,
            ),
            reveal_interval: duration_or(
                &lookup,
                "VET_CHAT_REVEAL_INTERVAL_MS",
                Duration::from_millis,
                defaults.reveal_interval,
            ),
            greeting: lookup("VET_CHAT_GREETING").unwrap_or(defaults.greeting),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    #[must_use]
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }
}

fn duration_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    unit: fn(u64) -> Duration,
    default: Duration,
) -> Duration {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(value) => unit(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring unparseable setting");
            default
        }
    }
}

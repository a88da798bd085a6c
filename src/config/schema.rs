//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a missing or empty config file yields a
//! working relay.

use serde::{Deserialize, Serialize};

/// Public Solana mainnet JSON-RPC endpoints, tried in this order when no
/// provider is configured. Order matters; it is the attempt order.
pub const PUBLIC_RPC_URLS: [&str; 3] = [
    "https://api.mainnet-beta.solana.com",
    "https://rpc.ankr.com/solana",
    "https://solana.public-rpc.com",
];

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Upstream targets and the per-attempt timeout.
    pub upstream: UpstreamConfig,

    /// Timeout configuration for the inbound side.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Upstream target configuration.
///
/// When `provider_url` is set (typically via the `SOLANA_RPC_URL` environment
/// variable) it is the only target ever attempted; the fallback list is used
/// exclusively when no provider is configured.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Optional preferred provider endpoint (e.g., a Helius or QuickNode URL).
    pub provider_url: Option<String>,

    /// Ordered fallback endpoints, attempted first-to-last.
    pub fallback_urls: Vec<String>,

    /// Per-attempt timeout in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider_url: None,
            fallback_urls: PUBLIC_RPC_URLS.iter().map(|s| s.to_string()).collect(),
            attempt_timeout_ms: 8_000,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds. Must exceed the worst case of
    /// fallback count x attempt timeout.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

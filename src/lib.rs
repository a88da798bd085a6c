//! Solana JSON-RPC forwarding relay library.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use forward::Forwarder;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

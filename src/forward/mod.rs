//! Request forwarding subsystem: the core of the relay.
//!
//! # Data Flow
//! ```text
//! opaque payload
//!     → forwarder.rs (select target sequence: provider alone, or fallbacks in order)
//!     → deliver (single POST raced against the attempt timer)
//!     → first HTTP response wins, error statuses included
//!     → or AllFailed with the last attempt's error description
//! ```
//!
//! # Design Decisions
//! - Upstream error statuses are passthrough, never treated as relay errors
//! - A configured provider is exclusive; no silent fallback behind it
//! - Timing out abandons the in-flight call rather than cancelling it

pub mod forwarder;
pub mod types;

pub use forwarder::Forwarder;
pub use types::{DeliveryError, ForwardError, UpstreamResponse};

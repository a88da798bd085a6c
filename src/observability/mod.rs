//! Observability subsystem.
//!
//! Structured logging goes through `tracing` (initialized in `main`); this
//! module owns the Prometheus metrics endpoint and the recording helpers
//! called from the HTTP handler and the forwarder.

pub mod metrics;

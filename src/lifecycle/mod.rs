//! Lifecycle management subsystem.
//!
//! Startup happens in `main` (config, then subsystems, then the listener);
//! this module owns the shutdown side: a broadcast coordinator and the signal
//! watcher that trips it.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

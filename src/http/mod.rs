//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, method dispatch)
//!     → forward subsystem (target selection + delivery)
//!     → response mapping (verbatim passthrough, or 502 error envelope)
//!     → Send to client
//! ```

pub mod server;

pub use server::HttpServer;

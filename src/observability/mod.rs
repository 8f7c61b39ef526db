//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http client, dispatcher, event sockets produce:
//!     → tracing events (structured fields: dlt, path, socket_id, kind)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber installed by the embedding binary
//!     → any `metrics` recorder the embedding binary installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

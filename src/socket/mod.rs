//! Broker event socket.
//!
//! # Data Flow
//! ```text
//! caller watch/unwatch ──▶ SocketSender ──▶ mpsc ──▶ writer half ──▶ broker
//! broker ──▶ reader half ──▶ parse_inbound ──▶ ListenerRegistry ──▶ listeners
//! ```

pub mod event_socket;
pub mod listeners;
pub mod message;

pub use event_socket::{EventSocket, SocketSender, SocketState};
pub use listeners::{ListenerId, ListenerRegistry};
pub use message::{EventKind, SocketEvent, SocketMessage, SocketStatus, WatchKind, WatchTarget};

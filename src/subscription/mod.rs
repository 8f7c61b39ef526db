//! Broker subscriptions.
//!
//! ```text
//! subscribe(target, entries, consumer, status)
//!     → build_url (template placeholders)
//!     → EventSocket::new + once(ready, push watch-list)
//!     → connect() and return the handle
//! ```

pub mod orchestrator;

pub use orchestrator::SubscriptionOrchestrator;

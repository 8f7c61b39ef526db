//! HTTP plumbing towards the adapter and wallet services.
//!
//! # Data Flow
//! ```text
//! action flow ──▶ client.rs (reqwest send) ──▶ response.rs check_status
//!                                                  ├─ 2xx  → parsed JSON
//!                                                  ├─ !2xx → Api error
//!                                                  └─ junk → Internal error
//! ```

pub mod client;
pub mod response;

pub use client::ServiceClient;
pub use response::{check_status, ResultInfo, ServiceResponse};

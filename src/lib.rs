//! Client SDK for the Hancock ledger services.
//!
//! Submits transactions to Ethereum and Bitcoin through the adapter and wallet
//! services, and watches ledger events through the broker.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod ledger;
pub mod observability;
pub mod socket;
pub mod subscription;

pub use client::{BitcoinClient, EthereumClient, HancockClient};
pub use config::schema::HancockConfig;
pub use dispatch::{Callback, InvokeOptions, SigningPath, TransactionDispatcher};
pub use error::{ErrorKind, HancockError, HancockResult};
pub use ledger::{Bitcoin, Dlt, Ethereum, Ledger, PrivateKey, TxSigner};
pub use socket::{EventKind, EventSocket, SocketEvent, SocketStatus, WatchTarget};
pub use subscription::SubscriptionOrchestrator;

//! Per-ledger clients and the facade bundling them.
//!
//! # Data Flow
//! ```text
//! HancockClient
//!   ├─ ethereum() ─▶ EthereumClient ─┐
//!   └─ bitcoin()  ─▶ BitcoinClient  ─┴─▶ LedgerCore
//!                                         ├─ adapter ServiceClient
//!                                         ├─ TransactionDispatcher (wallet)
//!                                         └─ SubscriptionOrchestrator (broker)
//! ```
//!
//! # Design Decisions
//! - One `reqwest::Client` (one connection pool) shared by every service
//! - Config is loaded once and shared through `Arc`

pub mod bitcoin;
pub mod ethereum;
mod shared;

use std::sync::Arc;

use crate::config::HancockConfig;
use crate::ledger::{Bitcoin, Ethereum};

pub use bitcoin::BitcoinClient;
pub use ethereum::EthereumClient;

/// Entry point bundling one client per ledger family.
#[derive(Debug, Clone)]
pub struct HancockClient {
    config: Arc<HancockConfig>,
    ethereum: EthereumClient,
    bitcoin: BitcoinClient,
}

impl HancockClient {
    /// Clients with the default ledger capabilities.
    pub fn new(config: HancockConfig) -> Self {
        Self::with_ledgers(config, Ethereum::default(), Bitcoin::default())
    }

    /// Clients with caller-supplied ledger capabilities, e.g. a Bitcoin signer.
    pub fn with_ledgers(config: HancockConfig, ethereum: Ethereum, bitcoin: Bitcoin) -> Self {
        let config = Arc::new(config);
        let http = reqwest::Client::new();
        Self {
            ethereum: EthereumClient::new(config.clone(), ethereum, http.clone()),
            bitcoin: BitcoinClient::new(config.clone(), bitcoin, http),
            config,
        }
    }

    pub fn ethereum(&self) -> &EthereumClient {
        &self.ethereum
    }

    pub fn bitcoin(&self) -> &BitcoinClient {
        &self.bitcoin
    }

    pub fn config(&self) -> &HancockConfig {
        &self.config
    }
}

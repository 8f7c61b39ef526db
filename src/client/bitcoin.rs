//! Bitcoin client.

use serde_json::Value;
use std::sync::Arc;

use crate::client::shared::LedgerCore;
use crate::config::HancockConfig;
use crate::dispatch::InvokeOptions;
use crate::error::HancockResult;
use crate::ledger::{Bitcoin, Ledger};
use crate::socket::{EventSocket, SocketStatus, WatchTarget};

/// Client for the Bitcoin family.
#[derive(Clone)]
pub struct BitcoinClient {
    core: LedgerCore,
}

impl BitcoinClient {
    pub fn new(config: Arc<HancockConfig>, ledger: Bitcoin, http: reqwest::Client) -> Self {
        Self {
            core: LedgerCore::new(config, Arc::new(ledger), http),
        }
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.core.ledger()
    }

    /// Balance of `address` in satoshi, as a decimal string.
    pub async fn get_balance(&self, address: &str) -> HancockResult<String> {
        self.core.get_balance(address).await
    }

    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        value: &str,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        self.core.transfer(from, to, value, options).await
    }

    pub fn subscribe_to_transfer(
        &self,
        addresses: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe_with(WatchTarget::Transfers, addresses, consumer, status, |_| {})
    }

    pub fn subscribe_to_transaction(
        &self,
        addresses: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe_with(WatchTarget::Transactions, addresses, consumer, status, |_| {})
    }

    /// Subscribe, registering listeners through `register` before connecting.
    pub fn subscribe_with<F>(
        &self,
        target: WatchTarget,
        entries: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
        register: F,
    ) -> HancockResult<EventSocket>
    where
        F: FnOnce(&EventSocket),
    {
        self.core.subscribe(target, entries, consumer, status, register)
    }
}

impl std::fmt::Debug for BitcoinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitcoinClient").finish_non_exhaustive()
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the SDK.
//! All types derive Serde traits for deserialization from config files.
//!
//! Resource paths are templates; placeholders are substituted per call with
//! [`fill_template`].

use serde::{Deserialize, Serialize};

pub const DLT_PLACEHOLDER: &str = "__DLT__";
pub const ADDRESS_PLACEHOLDER: &str = "__ADDRESS__";
pub const ADDRESS_OR_ALIAS_PLACEHOLDER: &str = "__ADDRESS_OR_ALIAS__";
pub const SENDER_PLACEHOLDER: &str = "__SENDER__";
pub const CONSUMER_PLACEHOLDER: &str = "__CONSUMER__";
pub const STATUS_PLACEHOLDER: &str = "__STATUS__";

/// Root configuration for the SDK.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HancockConfig {
    /// Service that builds raw ledger transactions.
    pub adapter: AdapterConfig,

    /// Service that signs and relays transactions.
    pub wallet: WalletConfig,

    /// Service streaming ledger events over WebSocket.
    pub broker: BrokerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Adapter service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Scheme and host (e.g., "http://localhost").
    pub host: String,
    pub port: u16,
    /// Path prefix shared by every resource.
    pub base: String,
    pub resources: AdapterResources,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 3000,
            base: String::new(),
            resources: AdapterResources::default(),
        }
    }
}

impl AdapterConfig {
    pub fn url(&self, resource: &str) -> String {
        join_url(&self.host, self.port, &self.base, resource)
    }
}

/// Adapter resource templates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterResources {
    pub balance: String,
    pub transfer: String,
    pub invoke: String,
    pub invoke_abi: String,
    pub register: String,
    pub smart_contract_find_all: String,
    pub token_register: String,
    pub token_transfer: String,
    pub token_transfer_from: String,
    pub token_approve: String,
    pub token_allowance: String,
    pub token_balance: String,
    pub token_metadata: String,
    pub token_find_all: String,
    pub encode: String,
    pub decode: String,
}

impl Default for AdapterResources {
    fn default() -> Self {
        Self {
            balance: "/__DLT__/balance/__ADDRESS__".to_string(),
            transfer: "/__DLT__/transfer".to_string(),
            invoke: "/__DLT__/smartcontract/__ADDRESS_OR_ALIAS__".to_string(),
            invoke_abi: "/__DLT__/smartcontract/invokeAbi".to_string(),
            register: "/__DLT__/smartcontract/register".to_string(),
            smart_contract_find_all: "/__DLT__/smartcontract".to_string(),
            token_register: "/__DLT__/token/register".to_string(),
            token_transfer: "/__DLT__/token/__ADDRESS_OR_ALIAS__/transfer".to_string(),
            token_transfer_from: "/__DLT__/token/__ADDRESS_OR_ALIAS__/transferFrom".to_string(),
            token_approve: "/__DLT__/token/__ADDRESS_OR_ALIAS__/approve".to_string(),
            token_allowance: "/__DLT__/token/__ADDRESS_OR_ALIAS__/allowance".to_string(),
            token_balance: "/__DLT__/token/__ADDRESS_OR_ALIAS__/balance/__ADDRESS__".to_string(),
            token_metadata: "/__DLT__/token/__ADDRESS_OR_ALIAS__/metadata".to_string(),
            token_find_all: "/__DLT__/token".to_string(),
            encode: "/__DLT__/protocol/encode".to_string(),
            decode: "/__DLT__/protocol/decode".to_string(),
        }
    }
}

/// Wallet service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    pub host: String,
    pub port: u16,
    pub base: String,
    pub resources: WalletResources,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 3001,
            base: String::new(),
            resources: WalletResources::default(),
        }
    }
}

impl WalletConfig {
    pub fn url(&self, resource: &str) -> String {
        join_url(&self.host, self.port, &self.base, resource)
    }
}

/// Wallet resource templates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletResources {
    /// Relay a raw transaction; the wallet signs it.
    pub send_tx: String,
    /// Relay a transaction signed by the caller.
    pub send_signed_tx: String,
    /// Hand a raw transaction to a registered sign provider.
    pub sign_tx: String,
}

impl Default for WalletResources {
    fn default() -> Self {
        Self {
            send_tx: "/__DLT__/send-tx".to_string(),
            send_signed_tx: "/__DLT__/send-signed-tx".to_string(),
            sign_tx: "/__DLT__/sign-tx".to_string(),
        }
    }
}

/// Broker service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// WebSocket scheme and host (e.g., "ws://localhost").
    pub host: String,
    pub port: u16,
    pub base: String,
    pub resources: BrokerResources,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "ws://localhost".to_string(),
            port: 3002,
            base: String::new(),
            resources: BrokerResources::default(),
        }
    }
}

impl BrokerConfig {
    pub fn url(&self, resource: &str) -> String {
        join_url(&self.host, self.port, &self.base, resource)
    }
}

/// Broker resource templates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrokerResources {
    pub events: String,
}

impl Default for BrokerResources {
    fn default() -> Self {
        Self {
            events: "/__DLT__/subscribe?address=__ADDRESS__&sender=__SENDER__&consumer=__CONSUMER__&status=__STATUS__"
                .to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

fn join_url(host: &str, port: u16, base: &str, resource: &str) -> String {
    format!(
        "{}:{}{}{}",
        host.trim_end_matches('/'),
        port,
        base.trim_end_matches('/'),
        resource
    )
}

/// Substitute every `(placeholder, value)` pair into `template`.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HancockConfig::default();
        assert_eq!(config.adapter.port, 3000);
        assert_eq!(config.wallet.port, 3001);
        assert_eq!(config.broker.host, "ws://localhost");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_service_url() {
        let mut adapter = AdapterConfig::default();
        adapter.host = "http://adapter/".to_string();
        adapter.base = "/v1/".to_string();
        assert_eq!(adapter.url("/ethereum/transfer"), "http://adapter:3000/v1/ethereum/transfer");
    }

    #[test]
    fn test_fill_template() {
        let resources = AdapterResources::default();
        let path = fill_template(
            &resources.token_balance,
            &[
                (DLT_PLACEHOLDER, "ethereum"),
                (ADDRESS_OR_ALIAS_PLACEHOLDER, "my-token"),
                (ADDRESS_PLACEHOLDER, "0xabc"),
            ],
        );
        assert_eq!(path, "/ethereum/token/my-token/balance/0xabc");
    }

    #[test]
    fn test_partial_toml() {
        let config: HancockConfig = toml::from_str(
            r#"
            [adapter]
            host = "https://adapter.example"
            port = 8443

            [broker.resources]
            events = "/__DLT__/events?consumer=__CONSUMER__"
            "#,
        )
        .unwrap();
        assert_eq!(config.adapter.port, 8443);
        assert_eq!(config.adapter.resources.transfer, "/__DLT__/transfer");
        assert_eq!(config.broker.resources.events, "/__DLT__/events?consumer=__CONSUMER__");
        assert_eq!(config.wallet.port, 3001);
    }
}

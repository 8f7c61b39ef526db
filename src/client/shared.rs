//! Plumbing shared by the per-ledger clients.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::form_urlencoded;

use crate::config::{fill_template, HancockConfig, ADDRESS_PLACEHOLDER, DLT_PLACEHOLDER};
use crate::dispatch::{ensure_signing_path, InvokeOptions, TransactionDispatcher};
use crate::error::{codes, HancockResult};
use crate::http::response::{decode, envelope_data, ServiceResponse};
use crate::http::ServiceClient;
use crate::ledger::{require_addresses, require_non_empty, Ledger, RawTransaction};
use crate::socket::{EventSocket, SocketStatus, WatchTarget};
use crate::subscription::SubscriptionOrchestrator;

const ADAPTER: &str = "adapter";

#[derive(Serialize)]
struct TransferRequest<'a> {
    from: &'a str,
    to: &'a str,
    value: &'a str,
    data: &'a str,
}

#[derive(Clone)]
pub(crate) struct LedgerCore {
    config: Arc<HancockConfig>,
    ledger: Arc<dyn Ledger>,
    adapter: ServiceClient,
    dispatcher: TransactionDispatcher,
    subscriptions: SubscriptionOrchestrator,
}

impl LedgerCore {
    pub(crate) fn new(config: Arc<HancockConfig>, ledger: Arc<dyn Ledger>, http: reqwest::Client) -> Self {
        Self {
            adapter: ServiceClient::new(http.clone(), ADAPTER),
            dispatcher: TransactionDispatcher::new(
                ServiceClient::new(http, "wallet"),
                config.clone(),
                ledger.clone(),
            ),
            subscriptions: SubscriptionOrchestrator::new(config.clone(), ledger.clone()),
            config,
            ledger,
        }
    }

    pub(crate) fn config(&self) -> &HancockConfig {
        &self.config
    }

    pub(crate) fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Adapter URL for `template` with the ledger and `values` substituted.
    /// Resolve an adapter resource. Each value fills exactly one path segment.
    pub(crate) fn adapter_url(&self, template: &str, values: &[(&str, &str)]) -> String {
        let resource = fill_template(template, &[(DLT_PLACEHOLDER, self.ledger.dlt().as_str())]);
        let encoded: Vec<(&str, String)> = values
            .iter()
            .map(|(placeholder, value)| (*placeholder, path_segment(value)))
            .collect();
        let encoded: Vec<(&str, &str)> = encoded.iter().map(|(p, v)| (*p, v.as_str())).collect();
        self.config.adapter.url(&fill_template(&resource, &encoded))
    }

    pub(crate) async fn adapter_get(&self, url: &str) -> HancockResult<Value> {
        envelope_data(ADAPTER, self.adapter.get(url).await?)
    }

    /// POST and return the `data` member of the answer.
    pub(crate) async fn adapter_post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> HancockResult<Value> {
        envelope_data(ADAPTER, self.adapter.post(url, body, &[]).await?)
    }

    /// POST and return the whole answer envelope.
    pub(crate) async fn adapter_post_envelope<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> HancockResult<ServiceResponse> {
        decode(ADAPTER, self.adapter.post(url, body, &[]).await?)
    }

    /// Ask the adapter for a raw transaction.
    pub(crate) async fn adapt<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> HancockResult<RawTransaction> {
        let raw: RawTransaction = envelope_data(ADAPTER, self.adapter.post(url, body, &[]).await?)?;
        tracing::debug!(dlt = %self.ledger.dlt(), url = %url, "Raw transaction adapted");
        Ok(raw)
    }

    /// Adapt, then sign and send. Returns the wallet body.
    pub(crate) async fn adapt_and_dispatch<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        let raw = self.adapt(url, body).await?;
        let outcome = self.dispatcher.sign_and_send(raw, options).await?;
        Ok(outcome.response)
    }

    pub(crate) async fn get_balance(&self, address: &str) -> HancockResult<String> {
        require_non_empty(&[("address", address)])?;
        require_addresses(self.ledger(), &[("address", address)])?;

        let address = self.ledger.normalize_address(address);
        let url = self.adapter_url(
            &self.config.adapter.resources.balance,
            &[(ADDRESS_PLACEHOLDER, &address)],
        );
        let data = self.adapter_get(&url).await?;
        quantity_string(&data, "balance")
    }

    pub(crate) async fn transfer(
        &self,
        from: &str,
        to: &str,
        value: &str,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        require_non_empty(&[("from", from), ("to", to), ("value", value)])?;
        require_addresses(self.ledger(), &[("from", from), ("to", to)])?;
        ensure_signing_path(options)?;

        let from = self.ledger.normalize_address(from);
        let to = self.ledger.normalize_address(to);
        let url = self.adapter_url(&self.config.adapter.resources.transfer, &[]);
        let body = TransferRequest {
            from: &from,
            to: &to,
            value,
            data: "",
        };
        self.adapt_and_dispatch(&url, &body, options).await
    }

    pub(crate) fn subscribe<F>(
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
        self.subscriptions
            .subscribe_with(target, entries, consumer, status, register)
    }
}

/// Read `field` of `data` as a decimal string; numbers and strings are accepted.
pub(crate) fn quantity_string(data: &Value, field: &str) -> HancockResult<String> {
    match data.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(codes::MALFORMED_RESPONSE
            .build()
            .with_message(format!("adapter response has no '{}'", field))),
    }
}

fn path_segment(value: &str) -> String {
    // Form encoding escapes '+' itself, so a remaining '+' is always a space.
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ethereum;
    use serde_json::json;

    #[test]
    fn test_adapter_url() {
        let core = LedgerCore::new(
            Arc::new(HancockConfig::default()),
            Arc::new(Ethereum::default()),
            reqwest::Client::new(),
        );
        let url = core.adapter_url(
            "/__DLT__/token/__ADDRESS_OR_ALIAS__/metadata",
            &[(crate::config::ADDRESS_OR_ALIAS_PLACEHOLDER, "my-token")],
        );
        assert_eq!(url, "http://localhost:3000/ethereum/token/my-token/metadata");
    }

    #[test]
    fn test_adapter_url_escapes_aliases() {
        let core = LedgerCore::new(
            Arc::new(HancockConfig::default()),
            Arc::new(Ethereum::default()),
            reqwest::Client::new(),
        );
        let template = "/__DLT__/token/__ADDRESS_OR_ALIAS__/transfer";
        let url = |alias: &str| core.adapter_url(template, &[(crate::config::ADDRESS_OR_ALIAS_PLACEHOLDER, alias)]);

        assert_eq!(url("gold/v2"), "http://localhost:3000/ethereum/token/gold%2Fv2/transfer");
        assert_eq!(url("gold#v2"), "http://localhost:3000/ethereum/token/gold%23v2/transfer");
        assert_eq!(url("gold?v2"), "http://localhost:3000/ethereum/token/gold%3Fv2/transfer");
        assert_eq!(url("gold v2+"), "http://localhost:3000/ethereum/token/gold%20v2%2B/transfer");
    }

    #[test]
    fn test_quantity_string() {
        assert_eq!(quantity_string(&json!({"balance": "12"}), "balance").unwrap(), "12");
        assert_eq!(quantity_string(&json!({"balance": 12}), "balance").unwrap(), "12");
        assert!(quantity_string(&json!({}), "balance").is_err());
    }

    #[test]
    fn test_transfer_body() {
        let body = TransferRequest {
            from: "a",
            to: "b",
            value: "1",
            data: "",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"from": "a", "to": "b", "value": "1", "data": ""})
        );
    }
}

//! Ethereum client.
//!
//! # Flow of a state-changing action
//! ```text
//! validate inputs ──▶ InvalidParameter / FormatParameter
//! signing options ──▶ NoKeyNorProvider
//! adapter POST    ──▶ raw transaction
//! sign_and_send   ──▶ wallet body
//! ```
//! Read-only calls stop after the adapter.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::client::shared::LedgerCore;
use crate::config::schema::AdapterResources;
use crate::config::{HancockConfig, ADDRESS_OR_ALIAS_PLACEHOLDER, ADDRESS_PLACEHOLDER};
use crate::dispatch::{ensure_signing_path, InvokeOptions};
use crate::error::HancockResult;
use crate::http::ServiceResponse;
use crate::ledger::{require_addresses, require_non_empty, Ethereum, Ledger};
use crate::socket::{EventSocket, SocketStatus, WatchTarget};

#[derive(Serialize)]
struct InvokeRequest<'a> {
    method: &'a str,
    from: &'a str,
    params: &'a [Value],
    action: &'static str,
}

#[derive(Serialize)]
struct InvokeAbiRequest<'a> {
    method: &'a str,
    from: &'a str,
    params: &'a [Value],
    action: &'static str,
    to: &'a str,
    abi: &'a Value,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    address: &'a str,
    alias: &'a str,
}

#[derive(Serialize)]
struct TokenTransferRequest<'a> {
    from: &'a str,
    to: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct TokenTransferFromRequest<'a> {
    from: &'a str,
    sender: &'a str,
    to: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct TokenApproveRequest<'a> {
    from: &'a str,
    spender: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenAllowanceRequest<'a> {
    from: &'a str,
    token_owner: &'a str,
    spender: &'a str,
}

#[derive(Serialize)]
struct EncodeBody<'a> {
    value: &'a str,
    to: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct EncodeRequest<'a> {
    action: &'a str,
    body: EncodeBody<'a>,
    dlt: &'static str,
}

#[derive(Serialize)]
struct DecodeRequest<'a> {
    code: &'a str,
}

/// Client for the Ethereum family.
#[derive(Clone)]
pub struct EthereumClient {
    core: LedgerCore,
}

impl EthereumClient {
    pub fn new(config: Arc<HancockConfig>, ledger: Ethereum, http: reqwest::Client) -> Self {
        Self {
            core: LedgerCore::new(config, Arc::new(ledger), http),
        }
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.core.ledger()
    }

    /// Balance of `address` in wei, as a decimal string.
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

    /// Register `address` under `alias` in the adapter.
    pub async fn register_smart_contract(&self, alias: &str, address: &str) -> HancockResult<ServiceResponse> {
        require_non_empty(&[("alias", alias), ("address", address)])?;
        require_addresses(self.ledger(), &[("address", address)])?;

        let address = self.ledger().normalize_address(address);
        let alias = self.ledger().normalize_alias(alias);
        let url = self.core.adapter_url(&self.resources().register, &[]);
        self.core
            .adapter_post_envelope(&url, &RegisterRequest { address: &address, alias: &alias })
            .await
    }

    /// Every smart contract registered in the adapter.
    pub async fn get_all_smart_contracts(&self) -> HancockResult<Value> {
        let url = self.core.adapter_url(&self.resources().smart_contract_find_all, &[]);
        self.core.adapter_get(&url).await
    }

    /// Run a read-only contract method; nothing is signed.
    pub async fn call_smart_contract(
        &self,
        contract: &str,
        method: &str,
        params: &[Value],
        from: &str,
    ) -> HancockResult<Value> {
        let (contract, from) = self.check_invoke(contract, method, from)?;
        let url = self.invoke_url(&contract);
        let body = InvokeRequest {
            method,
            from: &from,
            params,
            action: "call",
        };
        self.core.adapter_post(&url, &body).await
    }

    /// Send a state-changing contract call.
    pub async fn invoke_smart_contract(
        &self,
        contract: &str,
        method: &str,
        params: &[Value],
        from: &str,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        let (contract, from) = self.check_invoke(contract, method, from)?;
        ensure_signing_path(options)?;

        let url = self.invoke_url(&contract);
        let body = InvokeRequest {
            method,
            from: &from,
            params,
            action: "send",
        };
        self.core.adapt_and_dispatch(&url, &body, options).await
    }

    /// Send a contract call encoded with a caller-supplied ABI.
    pub async fn invoke_abi_smart_contract(
        &self,
        contract: &str,
        method: &str,
        params: &[Value],
        from: &str,
        abi: &Value,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        let (contract, from) = self.check_invoke(contract, method, from)?;
        ensure_signing_path(options)?;

        let url = self.core.adapter_url(&self.resources().invoke_abi, &[]);
        let body = InvokeAbiRequest {
            method,
            from: &from,
            params,
            action: "send",
            to: &contract,
            abi,
        };
        self.core.adapt_and_dispatch(&url, &body, options).await
    }

    /// Register a token contract under `alias`.
    pub async fn token_register(&self, alias: &str, address: &str) -> HancockResult<ServiceResponse> {
        require_non_empty(&[("alias", alias), ("address", address)])?;
        require_addresses(self.ledger(), &[("address", address)])?;

        let address = self.ledger().normalize_address(address);
        let alias = self.ledger().normalize_alias(alias);
        let url = self.core.adapter_url(&self.resources().token_register, &[]);
        self.core
            .adapter_post_envelope(&url, &RegisterRequest { address: &address, alias: &alias })
            .await
    }

    pub async fn token_transfer(
        &self,
        from: &str,
        to: &str,
        value: &str,
        token: &str,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        require_non_empty(&[("from", from), ("to", to), ("value", value), ("token", token)])?;
        require_addresses(self.ledger(), &[("from", from), ("to", to)])?;
        ensure_signing_path(options)?;

        let from = self.ledger().normalize_address(from);
        let to = self.ledger().normalize_address(to);
        let url = self.token_url(&self.resources().token_transfer, token);
        let body = TokenTransferRequest {
            from: &from,
            to: &to,
            value,
        };
        self.core.adapt_and_dispatch(&url, &body, options).await
    }

    /// Move `value` tokens from `sender` to `to`, spending `from`'s allowance.
    pub async fn token_transfer_from(
        &self,
        from: &str,
        sender: &str,
        to: &str,
        value: &str,
        token: &str,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        require_non_empty(&[
            ("from", from),
            ("sender", sender),
            ("to", to),
            ("value", value),
            ("token", token),
        ])?;
        require_addresses(self.ledger(), &[("from", from), ("sender", sender), ("to", to)])?;
        ensure_signing_path(options)?;

        let from = self.ledger().normalize_address(from);
        let sender = self.ledger().normalize_address(sender);
        let to = self.ledger().normalize_address(to);
        let url = self.token_url(&self.resources().token_transfer_from, token);
        let body = TokenTransferFromRequest {
            from: &from,
            sender: &sender,
            to: &to,
            value,
        };
        self.core.adapt_and_dispatch(&url, &body, options).await
    }

    pub async fn token_approve(
        &self,
        from: &str,
        spender: &str,
        value: &str,
        token: &str,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        require_non_empty(&[("from", from), ("spender", spender), ("value", value), ("token", token)])?;
        require_addresses(self.ledger(), &[("from", from), ("spender", spender)])?;
        ensure_signing_path(options)?;

        let from = self.ledger().normalize_address(from);
        let spender = self.ledger().normalize_address(spender);
        let url = self.token_url(&self.resources().token_approve, token);
        let body = TokenApproveRequest {
            from: &from,
            spender: &spender,
            value,
        };
        self.core.adapt_and_dispatch(&url, &body, options).await
    }

    /// Query how much `spender` may spend on behalf of `token_owner`.
    ///
    /// Dispatched like any other contract transaction.
    pub async fn token_allowance(
        &self,
        from: &str,
        token_owner: &str,
        spender: &str,
        token: &str,
        options: &InvokeOptions,
    ) -> HancockResult<Value> {
        require_non_empty(&[
            ("from", from),
            ("tokenOwner", token_owner),
            ("spender", spender),
            ("token", token),
        ])?;
        require_addresses(
            self.ledger(),
            &[("from", from), ("tokenOwner", token_owner), ("spender", spender)],
        )?;
        ensure_signing_path(options)?;

        let from = self.ledger().normalize_address(from);
        let token_owner = self.ledger().normalize_address(token_owner);
        let spender = self.ledger().normalize_address(spender);
        let url = self.token_url(&self.resources().token_allowance, token);
        let body = TokenAllowanceRequest {
            from: &from,
            token_owner: &token_owner,
            spender: &spender,
        };
        self.core.adapt_and_dispatch(&url, &body, options).await
    }

    /// Token balance of `address` in `token`.
    pub async fn get_token_balance(&self, address: &str, token: &str) -> HancockResult<Value> {
        require_non_empty(&[("address", address), ("token", token)])?;
        require_addresses(self.ledger(), &[("address", address)])?;

        let address = self.ledger().normalize_address(address);
        let token = self.ledger().normalize_address_or_alias(token);
        let url = self.core.adapter_url(
            &self.resources().token_balance,
            &[
                (ADDRESS_OR_ALIAS_PLACEHOLDER, &token),
                (ADDRESS_PLACEHOLDER, &address),
            ],
        );
        self.core.adapter_get(&url).await
    }

    /// Name, symbol, decimals and supply of `token`.
    pub async fn get_token_metadata(&self, token: &str) -> HancockResult<Value> {
        require_non_empty(&[("token", token)])?;
        let url = self.token_url(&self.resources().token_metadata, token);
        self.core.adapter_get(&url).await
    }

    pub async fn get_all_tokens(&self) -> HancockResult<Value> {
        let url = self.core.adapter_url(&self.resources().token_find_all, &[]);
        self.core.adapter_get(&url).await
    }

    /// Encode a transfer into the adapter's portable protocol format.
    pub async fn encode_protocol(
        &self,
        action: &str,
        value: &str,
        to: &str,
        data: &str,
    ) -> HancockResult<Value> {
        require_non_empty(&[("action", action), ("value", value), ("to", to)])?;
        require_addresses(self.ledger(), &[("to", to)])?;

        let to = self.ledger().normalize_address(to);
        let url = self.core.adapter_url(&self.resources().encode, &[]);
        let body = EncodeRequest {
            action,
            body: EncodeBody {
                value,
                to: &to,
                data,
            },
            dlt: self.ledger().dlt().as_str(),
        };
        self.core.adapter_post(&url, &body).await
    }

    pub async fn decode_protocol(&self, code: &str) -> HancockResult<Value> {
        require_non_empty(&[("code", code)])?;
        let url = self.core.adapter_url(&self.resources().decode, &[]);
        self.core.adapter_post(&url, &DecodeRequest { code }).await
    }

    pub fn subscribe_to_transfer(
        &self,
        addresses: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe(WatchTarget::Transfers, addresses, consumer, status)
    }

    pub fn subscribe_to_transaction(
        &self,
        addresses: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe(WatchTarget::Transactions, addresses, consumer, status)
    }

    pub fn subscribe_to_contract_transaction(
        &self,
        contracts: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe(WatchTarget::ContractTransactions, contracts, consumer, status)
    }

    pub fn subscribe_to_contract_event(
        &self,
        contracts: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe(WatchTarget::ContractEvents, contracts, consumer, status)
    }

    pub fn subscribe_to_contract_deployment(
        &self,
        addresses: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe(WatchTarget::ContractDeployments, addresses, consumer, status)
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

    fn subscribe(
        &self,
        target: WatchTarget,
        entries: Vec<String>,
        consumer: &str,
        status: Option<SocketStatus>,
    ) -> HancockResult<EventSocket> {
        self.subscribe_with(target, entries, consumer, status, |_| {})
    }

    fn resources(&self) -> &AdapterResources {
        &self.core.config().adapter.resources
    }

    /// Contract and caller checks shared by call, invoke and invokeAbi.
    fn check_invoke(&self, contract: &str, method: &str, from: &str) -> HancockResult<(String, String)> {
        require_non_empty(&[("contract", contract), ("method", method), ("from", from)])?;
        require_addresses(self.ledger(), &[("from", from)])?;
        Ok((
            self.ledger().normalize_address_or_alias(contract),
            self.ledger().normalize_address(from),
        ))
    }

    fn invoke_url(&self, contract: &str) -> String {
        self.core.adapter_url(
            &self.resources().invoke,
            &[(ADDRESS_OR_ALIAS_PLACEHOLDER, contract)],
        )
    }

    fn token_url(&self, template: &str, token: &str) -> String {
        let token = self.ledger().normalize_address_or_alias(token);
        self.core
            .adapter_url(template, &[(ADDRESS_OR_ALIAS_PLACEHOLDER, &token)])
    }
}

impl std::fmt::Debug for EthereumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumClient").finish_non_exhaustive()
    }
}

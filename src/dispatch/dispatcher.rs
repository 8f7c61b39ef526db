//! Sign-and-send decision engine.
//!
//! # Responsibilities
//! - Pick exactly one signing path per call
//! - Issue at most one wallet request
//! - Report the wallet body unchanged
//!
//! # Path Priority
//! ```text
//! sign_provider set ──▶ POST sign-tx        { rawTx, provider, backUrl? }
//! private_key set   ──▶ sign locally, POST send-signed-tx { tx: signed }
//! otherwise         ──▶ POST send-tx        { tx: raw }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::{fill_template, HancockConfig, DLT_PLACEHOLDER};
use crate::dispatch::options::InvokeOptions;
use crate::error::{codes, HancockResult};
use crate::http::ServiceClient;
use crate::ledger::{Ledger, PrivateKey, RawTransaction, SignedTransaction};
use crate::observability::metrics;

/// Request id header forwarded to the wallet on the provider path.
pub const REQUEST_ID_HEADER: &str = "vnd-hancock-request-id";

/// How a transaction reached the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningPath {
    /// Handed to a named sign provider through the wallet.
    Provider,
    /// Signed in-process with the caller's key.
    LocalKey,
    /// Signed by the wallet service itself.
    Wallet,
}

impl SigningPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningPath::Provider => "provider",
            SigningPath::LocalKey => "local_key",
            SigningPath::Wallet => "wallet",
        }
    }
}

impl fmt::Display for SigningPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub path: SigningPath,
    /// Parsed wallet response body.
    pub response: Value,
}

/// Fail with `NoKeyNorProvider` unless the caller supplied a key or a provider.
///
/// Action flows call this after parameter validation and before any request.
pub fn ensure_signing_path(options: &InvokeOptions) -> HancockResult<()> {
    if options.provider().is_none() && options.key().is_none() {
        return Err(codes::NO_KEY_NOR_PROVIDER.build());
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignTxRequest<'a> {
    raw_tx: &'a RawTransaction,
    provider: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    back_url: Option<&'a str>,
}

#[derive(Serialize)]
struct SendRequest<'a, T: Serialize> {
    tx: &'a T,
}

/// Chooses the signing path and talks to the wallet service.
#[derive(Clone)]
pub struct TransactionDispatcher {
    wallet: ServiceClient,
    config: Arc<HancockConfig>,
    ledger: Arc<dyn Ledger>,
}

impl TransactionDispatcher {
    pub fn new(wallet: ServiceClient, config: Arc<HancockConfig>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            wallet,
            config,
            ledger,
        }
    }

    /// Submit `raw` through the highest-priority path `options` allows.
    pub async fn sign_and_send(
        &self,
        raw: RawTransaction,
        options: &InvokeOptions,
    ) -> HancockResult<DispatchOutcome> {
        let dlt = self.ledger.dlt();

        let (path, response) = if let Some(provider) = options.provider() {
            let response = self
                .send_to_sign_provider(&raw, provider, options.back_url(), options.request_id())
                .await?;
            (SigningPath::Provider, response)
        } else if let Some(key) = options.key() {
            let signed = self.sign_locally(&raw, key)?;
            (SigningPath::LocalKey, self.send_signed(&signed).await?)
        } else {
            (SigningPath::Wallet, self.send(&raw).await?)
        };

        metrics::record_dispatch(dlt.as_str(), path.as_str());
        tracing::info!(dlt = %dlt, path = %path, "Transaction dispatched");

        Ok(DispatchOutcome { path, response })
    }

    /// POST the raw transaction to the wallet's sign-tx resource.
    pub async fn send_to_sign_provider(
        &self,
        raw: &RawTransaction,
        provider: &str,
        back_url: Option<&str>,
        request_id: Option<&str>,
    ) -> HancockResult<Value> {
        let url = self.wallet_url(&self.config.wallet.resources.sign_tx);
        let body = SignTxRequest {
            raw_tx: raw,
            provider,
            back_url,
        };
        let headers: Vec<(&'static str, String)> = request_id
            .map(|id| vec![(REQUEST_ID_HEADER, id.to_string())])
            .unwrap_or_default();

        tracing::debug!(dlt = %self.ledger.dlt(), provider, "Sending to sign provider");
        self.wallet.post(&url, &body, &headers).await
    }

    /// POST an already signed transaction to the wallet's send-signed-tx resource.
    pub async fn send_signed(&self, signed: &SignedTransaction) -> HancockResult<Value> {
        let url = self.wallet_url(&self.config.wallet.resources.send_signed_tx);
        self.wallet.post(&url, &SendRequest { tx: signed }, &[]).await
    }

    /// POST the raw transaction for server-side signing.
    pub async fn send(&self, raw: &RawTransaction) -> HancockResult<Value> {
        let url = self.wallet_url(&self.config.wallet.resources.send_tx);
        self.wallet.post(&url, &SendRequest { tx: raw }, &[]).await
    }

    fn sign_locally(&self, raw: &RawTransaction, key: &PrivateKey) -> HancockResult<SignedTransaction> {
        let dlt = self.ledger.dlt();
        self.ledger.sign(raw, key).map_err(|e| {
            tracing::warn!(dlt = %dlt, error = %e, "Local signing failed");
            e.wrap_in(
                codes::SIGNING
                    .build()
                    .with_message(format!("Could not sign {} transaction locally", dlt)),
            )
        })
    }

    fn wallet_url(&self, template: &str) -> String {
        self.config.wallet.url(&fill_template(
            template,
            &[(DLT_PLACEHOLDER, self.ledger.dlt().as_str())],
        ))
    }
}

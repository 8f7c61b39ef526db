//! Ethereum address rules and local transaction signing.
//!
//! # Security
//! - Private keys are parsed per call and dropped afterwards
//! - Keys are never logged or serialized

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{hex, Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

use crate::error::{codes, HancockError, HancockResult};
use crate::ledger::{Dlt, Ledger, PrivateKey, RawTransaction, SignedTransaction, TxSigner};

static ADDRESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{40}$").expect("static address pattern"));

/// Ethereum ledger capabilities.
#[derive(Clone)]
pub struct Ethereum {
    signer: Arc<dyn TxSigner>,
}

impl Default for Ethereum {
    fn default() -> Self {
        Self {
            signer: Arc::new(EthereumSigner),
        }
    }
}

impl Ethereum {
    /// Replace the built-in signer.
    pub fn with_signer(signer: Arc<dyn TxSigner>) -> Self {
        Self { signer }
    }
}

impl Ledger for Ethereum {
    fn dlt(&self) -> Dlt {
        Dlt::Ethereum
    }

    fn is_address(&self, value: &str) -> bool {
        ADDRESS_PATTERN.is_match(value.trim())
    }

    /// Lowercase, `0x`-prefixed.
    fn normalize_address(&self, address: &str) -> String {
        let lower = address.trim().to_lowercase();
        match lower.strip_prefix("0x") {
            Some(_) => lower,
            None => format!("0x{}", lower),
        }
    }

    fn sign(&self, raw: &RawTransaction, key: &PrivateKey) -> HancockResult<SignedTransaction> {
        self.signer.sign(raw, key)
    }
}

/// Raw transaction fields as produced by the adapter service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdaptedTransaction {
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default, alias = "gasLimit")]
    gas: Option<Value>,
    #[serde(default)]
    gas_price: Option<Value>,
    #[serde(default)]
    nonce: Option<Value>,
    #[serde(default)]
    chain_id: Option<Value>,
}

/// Signs legacy transactions with a secp256k1 key.
///
/// Output is the `0x`-prefixed EIP-2718 encoding of the signed transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct EthereumSigner;

impl TxSigner for EthereumSigner {
    fn sign(&self, raw: &RawTransaction, key: &PrivateKey) -> HancockResult<SignedTransaction> {
        let key_hex = key.expose().trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| signing_error("Invalid private key format").with_extended(e))?;

        let fields: AdaptedTransaction = serde_json::from_value(raw.0.clone())
            .map_err(|e| signing_error("Raw transaction has an unexpected shape").with_extended(e))?;

        let to = match fields.to.as_deref().map(str::trim) {
            Some(to) if !to.is_empty() => TxKind::Call(
                to.parse::<Address>()
                    .map_err(|e| signing_error("Invalid 'to' address").with_extended(e))?,
            ),
            _ => TxKind::Create,
        };

        let input = match fields.data.as_deref().map(str::trim) {
            Some(data) if !data.is_empty() && data != "0x" => data
                .parse::<Bytes>()
                .map_err(|e| signing_error("Invalid 'data' field").with_extended(e))?,
            _ => Bytes::new(),
        };

        let chain_id = match &fields.chain_id {
            Some(_) => Some(to_u64("chainId", quantity("chainId", &fields.chain_id)?)?),
            None => None,
        };

        let tx = TxLegacy {
            chain_id,
            nonce: to_u64("nonce", quantity("nonce", &fields.nonce)?)?,
            gas_price: to_u128("gasPrice", quantity("gasPrice", &fields.gas_price)?)?,
            gas_limit: to_u64("gas", quantity("gas", &fields.gas)?)?,
            to,
            value: quantity("value", &fields.value)?,
            input,
        };

        let signature = signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| signing_error("Signing failed").with_extended(e))?;

        let envelope = TxEnvelope::from(tx.into_signed(signature));
        Ok(SignedTransaction(hex::encode_prefixed(envelope.encoded_2718())))
    }
}

fn signing_error(message: &str) -> HancockError {
    codes::SIGNING.build().with_message(message)
}

/// Numeric field given as JSON number, hex string or decimal string. Missing is zero.
fn quantity(field: &str, value: &Option<Value>) -> HancockResult<U256> {
    match value {
        None | Some(Value::Null) => Ok(U256::ZERO),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| signing_error(&format!("'{}' must be a non-negative integer", field))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(U256::ZERO),
        Some(Value::String(s)) => s
            .trim()
            .parse::<U256>()
            .map_err(|e| signing_error(&format!("'{}' is not a valid quantity", field)).with_extended(e)),
        Some(_) => Err(signing_error(&format!("'{}' has an unexpected type", field))),
    }
}

fn to_u64(field: &str, value: U256) -> HancockResult<u64> {
    u64::try_from(value).map_err(|_| signing_error(&format!("'{}' does not fit in 64 bits", field)))
}

fn to_u128(field: &str, value: U256) -> HancockResult<u128> {
    u128::try_from(value).map_err(|_| signing_error(&format!("'{}' does not fit in 128 bits", field)))
}

//! Per-ledger capabilities.
//!
//! # Data Flow
//! ```text
//! caller input (address or alias)
//!     → Ledger::is_address / is_alias (classification)
//!     → Ledger::normalize_* (canonical form sent to services)
//! raw transaction from adapter
//!     → Ledger::sign (local signing, private-key path only)
//! ```
//!
//! # Design Decisions
//! - One trait object per ledger family, injected into dispatcher and orchestrator
//! - Classification is total: a non-empty input is either an address or an alias
//! - Signing is a swappable [`TxSigner`]; the SDK only ships an Ethereum signer

pub mod bitcoin;
pub mod ethereum;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{codes, HancockResult};

pub use bitcoin::Bitcoin;
pub use ethereum::{Ethereum, EthereumSigner};

/// Supported ledger families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dlt {
    Ethereum,
    Bitcoin,
}

impl Dlt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dlt::Ethereum => "ethereum",
            Dlt::Bitcoin => "bitcoin",
        }
    }
}

impl fmt::Display for Dlt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dlt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" => Ok(Dlt::Ethereum),
            "bitcoin" => Ok(Dlt::Bitcoin),
            other => Err(format!("unknown dlt '{}'", other)),
        }
    }
}

/// Unsigned, ledger-specific transaction built by the adapter service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTransaction(pub Value);

/// Signed transaction serialization, ready for the wallet's send-signed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedTransaction(pub String);

/// Private key material. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key text, for signers only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl From<&str> for PrivateKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for PrivateKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Local signing primitive: `sign(rawTx, privateKey) -> signedTx`.
pub trait TxSigner: Send + Sync {
    fn sign(&self, raw: &RawTransaction, key: &PrivateKey) -> HancockResult<SignedTransaction>;
}

/// Capability record of one ledger family.
pub trait Ledger: Send + Sync {
    fn dlt(&self) -> Dlt;

    /// True if `value` matches the ledger address format.
    fn is_address(&self, value: &str) -> bool;

    /// True for non-empty values that are not addresses.
    fn is_alias(&self, value: &str) -> bool {
        !value.trim().is_empty() && !self.is_address(value)
    }

    /// Canonical form of an address. Idempotent on valid input.
    fn normalize_address(&self, address: &str) -> String;

    fn normalize_alias(&self, alias: &str) -> String {
        alias.trim().to_string()
    }

    fn normalize_address_or_alias(&self, value: &str) -> String {
        if self.is_address(value) {
            self.normalize_address(value)
        } else {
            self.normalize_alias(value)
        }
    }

    /// Sign `raw` locally with `key`.
    fn sign(&self, raw: &RawTransaction, key: &PrivateKey) -> HancockResult<SignedTransaction>;
}

/// True if any value is empty (after trimming).
pub fn any_empty(values: &[&str]) -> bool {
    values.iter().any(|v| v.trim().is_empty())
}

/// True only if every value is a well-formed address of `ledger`.
pub fn all_addresses(ledger: &dyn Ledger, values: &[&str]) -> bool {
    values.iter().all(|v| ledger.is_address(v))
}

/// Reject with `InvalidParameter` naming the first empty parameter.
pub fn require_non_empty(params: &[(&str, &str)]) -> HancockResult<()> {
    match params.iter().find(|(_, value)| any_empty(&[*value])) {
        Some((name, _)) => Err(codes::INVALID_PARAMETER
            .build()
            .with_message(format!("Invalid parameter: '{}' must not be empty", name))),
        None => Ok(()),
    }
}

/// Reject with `FormatParameter` naming the first value that is not an address.
pub fn require_addresses(ledger: &dyn Ledger, params: &[(&str, &str)]) -> HancockResult<()> {
    match params.iter().find(|(_, value)| !ledger.is_address(value)) {
        Some((name, value)) => Err(codes::FORMAT_PARAMETER.build().with_message(format!(
            "Invalid parameter format: '{}' is not a {} address ({})",
            name,
            ledger.dlt(),
            value
        ))),
        None => Ok(()),
    }
}

//! Bitcoin address rules.
//!
//! No signer ships for Bitcoin; inject one with [`Bitcoin::with_signer`] to use
//! the private-key path, or dispatch through a sign provider.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::error::{codes, HancockResult};
use crate::ledger::{Dlt, Ledger, PrivateKey, RawTransaction, SignedTransaction, TxSigner};

// Base58 P2PKH/P2SH (mainnet 1/3, testnet m/n/2).
static BASE58_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[13mn2][a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("static base58 pattern")
});

// Bech32 segwit, either case but not mixed.
static BECH32_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((bc|tb)1[02-9ac-hj-np-z]{8,87}|(BC|TB)1[02-9AC-HJ-NP-Z]{8,87})$")
        .expect("static bech32 pattern")
});

/// Bitcoin ledger capabilities.
#[derive(Clone, Default)]
pub struct Bitcoin {
    signer: Option<Arc<dyn TxSigner>>,
}

impl Bitcoin {
    pub fn with_signer(signer: Arc<dyn TxSigner>) -> Self {
        Self {
            signer: Some(signer),
        }
    }
}

impl Ledger for Bitcoin {
    fn dlt(&self) -> Dlt {
        Dlt::Bitcoin
    }

    fn is_address(&self, value: &str) -> bool {
        let value = value.trim();
        BASE58_PATTERN.is_match(value) || BECH32_PATTERN.is_match(value)
    }

    /// Base58 is case-sensitive and kept as is; bech32 is lowercased.
    fn normalize_address(&self, address: &str) -> String {
        let address = address.trim();
        if BECH32_PATTERN.is_match(address) {
            address.to_lowercase()
        } else {
            address.to_string()
        }
    }

    fn sign(&self, raw: &RawTransaction, key: &PrivateKey) -> HancockResult<SignedTransaction> {
        match &self.signer {
            Some(signer) => signer.sign(raw, key),
            None => Err(codes::SIGNING
                .build()
                .with_message("No local signer configured for bitcoin")),
        }
    }
}

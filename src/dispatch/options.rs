//! Per-call submission options.

use crate::ledger::PrivateKey;

/// Where the wallet service should report the result of a provider signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub back_url: String,
    /// Sent as the `vnd-hancock-request-id` header.
    pub request_id: Option<String>,
}

impl Callback {
    pub fn new(back_url: impl Into<String>) -> Self {
        Self {
            back_url: back_url.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Signing inputs for one action. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    pub private_key: Option<PrivateKey>,
    pub sign_provider: Option<String>,
    pub callback: Option<Callback>,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_private_key(mut self, key: impl Into<PrivateKey>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn with_sign_provider(mut self, provider: impl Into<String>) -> Self {
        self.sign_provider = Some(provider.into());
        self
    }

    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub(crate) fn provider(&self) -> Option<&str> {
        self.sign_provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub(crate) fn key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref().filter(|k| !k.is_empty())
    }

    pub(crate) fn back_url(&self) -> Option<&str> {
        self.callback
            .as_ref()
            .map(|c| c.back_url.trim())
            .filter(|u| !u.is_empty())
    }

    pub(crate) fn request_id(&self) -> Option<&str> {
        self.callback
            .as_ref()
            .and_then(|c| c.request_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_absent() {
        let options = InvokeOptions::new()
            .with_private_key("")
            .with_sign_provider("  ")
            .with_callback(Callback::new("").with_request_id(""));
        assert!(options.key().is_none());
        assert!(options.provider().is_none());
        assert!(options.back_url().is_none());
        assert!(options.request_id().is_none());
    }

    #[test]
    fn test_builders() {
        let options = InvokeOptions::new()
            .with_sign_provider("ledger-hsm")
            .with_callback(Callback::new("https://app/cb").with_request_id("req-7"));
        assert_eq!(options.provider(), Some("ledger-hsm"));
        assert_eq!(options.back_url(), Some("https://app/cb"));
        assert_eq!(options.request_id(), Some("req-7"));
    }
}

//! Error taxonomy shared by every SDK component.
//!
//! # Data Flow
//! ```text
//! validation (params, signing path) ──▶ HancockError (Internal, 400)
//! http check_status boundary ─────────▶ HancockError (Api, downstream status)
//! malformed body / transport / signer ▶ HancockError (Internal, 500)
//!                                           │
//!                                           ▼ wrap()
//!                               surface error ─cause─▶ ... ─cause─▶ root
//! ```
//!
//! # Design Decisions
//! - Internal codes always carry the prefix of their type tag (`SDKAPI_`, `SDKINT_`)
//! - The cause chain is immutable; wrapping builds a new head, never edits a link
//! - Errors are cheap to clone so socket listeners can each receive one

pub mod codes;

use std::fmt;
use std::sync::Arc;

pub use codes::ErrorDefinition;

/// Result type for SDK operations.
pub type HancockResult<T> = Result<T, HancockError>;

/// Type tag of an error, deciding its internal code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Raised from a downstream service response.
    Api,
    /// Raised inside the SDK.
    Internal,
}

impl ErrorType {
    /// Prefix prepended to every internal code of this type.
    pub fn prefix(&self) -> &'static str {
        match self {
            ErrorType::Api => "SDKAPI",
            ErrorType::Internal => "SDKINT",
        }
    }
}

/// What went wrong, independent of the code it was reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required string input was empty.
    InvalidParameter,
    /// An input failed the ledger address or format check.
    FormatParameter,
    /// Dispatch attempted with neither a private key nor a sign provider.
    NoKeyNorProvider,
    /// A downstream service answered with a non-success status.
    Api,
    /// Any other failure.
    Internal,
}

/// Root cause that is not itself a [`HancockError`] (transport, parser, signer).
pub type ExternalCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// SDK error carrying a prefixed internal code and an optional cause chain.
#[derive(Clone)]
pub struct HancockError {
    kind: ErrorKind,
    error_type: ErrorType,
    internal_code: String,
    code: u16,
    message: String,
    cause: Option<Arc<HancockError>>,
    extended: Option<ExternalCause>,
}

impl HancockError {
    /// Build an error; `internal` is the unprefixed internal code.
    pub fn new(
        kind: ErrorKind,
        error_type: ErrorType,
        internal: &str,
        code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            error_type,
            internal_code: format!("{}_{}", error_type.prefix(), internal),
            code,
            message: message.into(),
            cause: None,
            extended: None,
        }
    }

    /// Build the `Api` error reported by a downstream service.
    ///
    /// `internal` is the code found in the service body, falling back to the status.
    pub fn api(status: u16, internal: Option<&str>, description: impl Into<String>) -> Self {
        let status_code = status.to_string();
        Self::new(
            ErrorKind::Api,
            ErrorType::Api,
            internal.unwrap_or(&status_code),
            status,
            description,
        )
    }

    /// Attach a non-SDK root cause.
    pub fn with_extended<E>(mut self, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.extended = Some(Arc::new(err));
        self
    }

    /// Replace the message while keeping the definition's codes.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Wrap `self` as the cause of `outer`, returning the new chain head.
    ///
    /// `outer` should be a fresh error; any cause it carried is replaced.
    pub fn wrap_in(self, mut outer: HancockError) -> HancockError {
        outer.cause = Some(Arc::new(self));
        outer
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Prefixed internal code, e.g. `SDKINT_50001`.
    pub fn internal_code(&self) -> &str {
        &self.internal_code
    }

    /// HTTP-like numeric code.
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Directly wrapped SDK error, if any.
    pub fn cause(&self) -> Option<&HancockError> {
        self.cause.as_deref()
    }

    /// Non-SDK root cause attached to this link, if any.
    pub fn extended(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.extended.as_deref()
    }

    /// The chain from this error down to the root, surface first.
    pub fn error_stack(&self) -> Vec<&HancockError> {
        let mut stack = vec![self];
        let mut current = self;
        while let Some(next) = current.cause() {
            stack.push(next);
            current = next;
        }
        stack
    }

    /// Deepest SDK error of the chain.
    pub fn root(&self) -> &HancockError {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }

    /// True if this error or any wrapped error has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.error_stack().iter().any(|e| e.kind == kind)
    }
}

impl fmt::Debug for HancockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HancockError")
            .field("kind", &self.kind)
            .field("internal_code", &self.internal_code)
            .field("code", &self.code)
            .field("message", &self.message)
            .field("cause", &self.cause)
            .field("extended", &self.extended.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

impl fmt::Display for HancockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.internal_code, self.message, self.code)
    }
}

impl std::error::Error for HancockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Some(cause) = &self.cause {
            return Some(cause.as_ref());
        }
        self.extended
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<&ErrorDefinition> for HancockError {
    fn from(def: &ErrorDefinition) -> Self {
        def.build()
    }
}

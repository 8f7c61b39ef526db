//! Static error definitions.

use super::{ErrorKind, ErrorType, HancockError};

/// A reusable error template; `build()` yields a fresh error without a cause.
#[derive(Debug, Clone, Copy)]
pub struct ErrorDefinition {
    pub kind: ErrorKind,
    pub error_type: ErrorType,
    pub internal: &'static str,
    pub code: u16,
    pub message: &'static str,
}

impl ErrorDefinition {
    pub fn build(&self) -> HancockError {
        HancockError::new(
            self.kind,
            self.error_type,
            self.internal,
            self.code,
            self.message,
        )
    }
}

pub const DEFAULT: ErrorDefinition = ErrorDefinition {
    kind: ErrorKind::Internal,
    error_type: ErrorType::Internal,
    internal: "50000",
    code: 500,
    message: "Service internal error",
};

pub const NO_KEY_NOR_PROVIDER: ErrorDefinition = ErrorDefinition {
    kind: ErrorKind::NoKeyNorProvider,
    error_type: ErrorType::Internal,
    internal: "50001",
    code: 400,
    message: "No key nor provider",
};

pub const INVALID_PARAMETER: ErrorDefinition = ErrorDefinition {
    kind: ErrorKind::InvalidParameter,
    error_type: ErrorType::Internal,
    internal: "50002",
    code: 400,
    message: "Invalid parameter",
};

pub const FORMAT_PARAMETER: ErrorDefinition = ErrorDefinition {
    kind: ErrorKind::FormatParameter,
    error_type: ErrorType::Internal,
    internal: "50003",
    code: 400,
    message: "Invalid parameter format",
};

/// A downstream body could not be interpreted.
pub const MALFORMED_RESPONSE: ErrorDefinition = ErrorDefinition {
    kind: ErrorKind::Internal,
    error_type: ErrorType::Internal,
    internal: "50004",
    code: 500,
    message: "Unexpected response from service",
};

pub const SIGNING: ErrorDefinition = ErrorDefinition {
    kind: ErrorKind::Internal,
    error_type: ErrorType::Internal,
    internal: "50005",
    code: 500,
    message: "Local signing failed",
};

pub const SOCKET: ErrorDefinition = ErrorDefinition {
    kind: ErrorKind::Internal,
    error_type: ErrorType::Internal,
    internal: "50006",
    code: 500,
    message: "Event socket error",
};

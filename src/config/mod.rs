//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HancockConfig (validated, immutable)
//!     → shared via Arc to every client, dispatcher and subscription
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; callers build a new client to change it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_or_default, ConfigError};
pub use schema::{
    fill_template, AdapterConfig, BrokerConfig, HancockConfig, LogFormat, ObservabilityConfig,
    WalletConfig, ADDRESS_OR_ALIAS_PLACEHOLDER, ADDRESS_PLACEHOLDER, CONSUMER_PLACEHOLDER,
    DLT_PLACEHOLDER, SENDER_PLACEHOLDER, STATUS_PLACEHOLDER,
};
pub use validation::{validate_config, ValidationError};

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check hosts carry a scheme the transport understands
//! - Check resource templates keep the placeholders the SDK substitutes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HancockConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{
    HancockConfig, ADDRESS_OR_ALIAS_PLACEHOLDER, ADDRESS_PLACEHOLDER, CONSUMER_PLACEHOLDER,
};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{service}: host must not be empty")]
    EmptyHost { service: &'static str },

    #[error("{service}: host '{host}' must start with one of {expected:?}")]
    BadScheme {
        service: &'static str,
        host: String,
        expected: &'static [&'static str],
    },

    #[error("{service}: port must be greater than zero")]
    ZeroPort { service: &'static str },

    #[error("{resource}: template '{template}' is missing {placeholder}")]
    MissingPlaceholder {
        resource: &'static str,
        template: String,
        placeholder: &'static str,
    },
}

const HTTP_SCHEMES: &[&str] = &["http://", "https://"];
const WS_SCHEMES: &[&str] = &["ws://", "wss://"];

/// Validate the whole configuration.
pub fn validate_config(config: &HancockConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_endpoint(&mut errors, "adapter", &config.adapter.host, config.adapter.port, HTTP_SCHEMES);
    check_endpoint(&mut errors, "wallet", &config.wallet.host, config.wallet.port, HTTP_SCHEMES);
    check_endpoint(&mut errors, "broker", &config.broker.host, config.broker.port, WS_SCHEMES);

    let adapter = &config.adapter.resources;
    for (resource, template, placeholder) in [
        ("adapter.balance", &adapter.balance, ADDRESS_PLACEHOLDER),
        ("adapter.invoke", &adapter.invoke, ADDRESS_OR_ALIAS_PLACEHOLDER),
        ("adapter.token_transfer", &adapter.token_transfer, ADDRESS_OR_ALIAS_PLACEHOLDER),
        ("adapter.token_transfer_from", &adapter.token_transfer_from, ADDRESS_OR_ALIAS_PLACEHOLDER),
        ("adapter.token_approve", &adapter.token_approve, ADDRESS_OR_ALIAS_PLACEHOLDER),
        ("adapter.token_allowance", &adapter.token_allowance, ADDRESS_OR_ALIAS_PLACEHOLDER),
        ("adapter.token_balance", &adapter.token_balance, ADDRESS_PLACEHOLDER),
        ("adapter.token_metadata", &adapter.token_metadata, ADDRESS_OR_ALIAS_PLACEHOLDER),
        ("broker.events", &config.broker.resources.events, CONSUMER_PLACEHOLDER),
    ] {
        if !template.contains(placeholder) {
            errors.push(ValidationError::MissingPlaceholder {
                resource,
                template: template.clone(),
                placeholder,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(
    errors: &mut Vec<ValidationError>,
    service: &'static str,
    host: &str,
    port: u16,
    expected: &'static [&'static str],
) {
    if host.is_empty() {
        errors.push(ValidationError::EmptyHost { service });
    } else if !expected.iter().any(|scheme| host.starts_with(scheme)) {
        errors.push(ValidationError::BadScheme {
            service,
            host: host.to_string(),
            expected,
        });
    }
    if port == 0 {
        errors.push(ValidationError::ZeroPort { service });
    }
}

//! Downstream response envelope and the check-status boundary.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{codes, HancockError, HancockResult};

/// `result` block of a service envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultInfo {
    /// Service-specific code; numeric or string depending on the service.
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ResultInfo {
    fn code_string(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// `{ result: { code, description }, data }` envelope used by adapter and wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse<T = Value> {
    pub result: Option<ResultInfo>,
    pub data: Option<T>,
}

/// Turn a raw HTTP answer into parsed JSON, or into the error the caller sees.
///
/// Non-2xx with a readable envelope → `Api` error with the service description.
/// Anything unreadable → `Internal` error.
pub fn check_status(service: &str, status: u16, body: &[u8]) -> HancockResult<Value> {
    if (200..300).contains(&status) {
        if body.is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_slice(body).map_err(|e| {
            codes::MALFORMED_RESPONSE
                .build()
                .with_message(format!("{} returned a body that is not JSON", service))
                .with_extended(e)
        });
    }

    let envelope = serde_json::from_slice::<ServiceResponse>(body)
        .ok()
        .and_then(|r| r.result);

    match envelope {
        Some(result) => {
            let description = result
                .description
                .clone()
                .unwrap_or_else(|| format!("{} responded with status {}", service, status));
            Err(HancockError::api(status, result.code_string().as_deref(), description))
        }
        None => Err(codes::MALFORMED_RESPONSE.build().with_message(format!(
            "{} responded with status {} and an unreadable body",
            service, status
        ))),
    }
}

/// Extract and decode the `data` member of an envelope.
pub fn envelope_data<T: DeserializeOwned>(service: &str, body: Value) -> HancockResult<T> {
    let envelope: ServiceResponse<T> = decode(service, body)?;
    envelope.data.ok_or_else(|| {
        codes::MALFORMED_RESPONSE
            .build()
            .with_message(format!("{} response has no data", service))
    })
}

/// Decode a parsed body into a typed value.
pub fn decode<T: DeserializeOwned>(service: &str, body: Value) -> HancockResult<T> {
    serde_json::from_value(body).map_err(|e| {
        codes::MALFORMED_RESPONSE
            .build()
            .with_message(format!("{} response has an unexpected shape", service))
            .with_extended(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_success_parses_body() {
        let body = br#"{"result":{"code":200,"description":"ok"},"data":{"balance":"10"}}"#;
        let value = check_status("adapter", 200, body).unwrap();
        assert_eq!(value["data"]["balance"], "10");
    }

    #[test]
    fn test_error_envelope_becomes_api_error() {
        let body = br#"{"result":{"code":"50001","description":"Ledger node unreachable"}}"#;
        let err = check_status("adapter", 500, body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.internal_code(), "SDKAPI_50001");
        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), "Ledger node unreachable");
    }

    #[test]
    fn test_unreadable_error_body_is_internal() {
        let err = check_status("wallet", 502, b"<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.internal_code(), "SDKINT_50004");
    }

    #[test]
    fn test_success_with_garbage_is_internal() {
        let err = check_status("wallet", 200, b"not json").unwrap_err();
        assert_eq!(err.internal_code(), "SDKINT_50004");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_envelope_data() {
        let data: Value = envelope_data("adapter", json!({"result": {}, "data": {"to": "0x1"}})).unwrap();
        assert_eq!(data["to"], "0x1");

        let err = envelope_data::<Value>("adapter", json!({"result": {}})).unwrap_err();
        assert_eq!(err.internal_code(), "SDKINT_50004");
    }

    #[test]
    fn test_envelope_data_typed() {
        #[derive(Debug, Deserialize)]
        struct Raw {
            to: String,
        }

        let raw: Raw = envelope_data("adapter", json!({"data": {"to": "0x1"}})).unwrap();
        assert_eq!(raw.to, "0x1");

        let err = envelope_data::<Raw>("adapter", json!({"result": null})).unwrap_err();
        assert_eq!(err.internal_code(), "SDKINT_50004");
    }
}

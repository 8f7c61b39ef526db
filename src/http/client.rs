//! JSON-over-HTTP client for one downstream service.
//!
//! # Responsibilities
//! - Issue GET/POST requests with JSON bodies
//! - Route every answer through [`check_status`]
//! - Convert transport failures into SDK errors, keeping the root cause
//!
//! No retries and no timeouts: the caller owns any deadline policy.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::error::{codes, HancockResult};
use crate::http::response::check_status;
use crate::observability::metrics;

/// Client bound to a named downstream service.
#[derive(Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    service: &'static str,
}

impl ServiceClient {
    /// Create a client sharing the given connection pool.
    pub fn new(client: reqwest::Client, service: &'static str) -> Self {
        Self { client, service }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// GET `url` and return the parsed body.
    pub async fn get(&self, url: &str) -> HancockResult<Value> {
        tracing::debug!(service = self.service, url = %url, "GET");
        self.execute(self.client.get(url), url).await
    }

    /// POST `body` as JSON to `url` and return the parsed body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&'static str, String)],
    ) -> HancockResult<Value> {
        tracing::debug!(service = self.service, url = %url, "POST");
        let request = self
            .client
            .post(url)
            .headers(to_header_map(headers)?)
            .json(body);
        self.execute(request, url).await
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> HancockResult<Value> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(service = self.service, url = %url, error = %e, "Request failed");
            codes::DEFAULT
                .build()
                .with_message(format!("{} request failed", self.service))
                .with_extended(e)
        })?;

        let status = response.status().as_u16();
        metrics::record_http_request(self.service, status);

        let body = response.bytes().await.map_err(|e| {
            codes::DEFAULT
                .build()
                .with_message(format!("{} response could not be read", self.service))
                .with_extended(e)
        })?;

        let result = check_status(self.service, status, &body);
        if let Err(e) = &result {
            tracing::warn!(service = self.service, url = %url, status, error = %e, "Service returned an error");
        }
        result
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .finish()
    }
}

fn to_header_map(headers: &[(&'static str, String)]) -> HancockResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let value = HeaderValue::from_str(value).map_err(|e| {
            codes::FORMAT_PARAMETER
                .build()
                .with_message(format!("Header '{}' has an invalid value", name))
                .with_extended(e)
        })?;
        map.insert(HeaderName::from_static(*name), value);
    }
    Ok(map)
}

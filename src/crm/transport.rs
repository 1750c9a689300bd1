//! HTTP transport to the upstream CRM.
//!
//! One `send` is exactly one physical request. Rate limiting, retries and
//! envelope interpretation happen in the client around it.

use reqwest::{Client, Method};
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::{CrmConfig, TimeoutConfig};
use crate::crm::encoder::EncodedRequest;
use crate::crm::envelope::RawResponse;
use crate::crm::error::TransportError;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Issues one authenticated request and returns the raw response.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &EncodedRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// reqwest-backed transport with a pooled connection set.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpTransport {
    pub fn new(crm: &CrmConfig, timeouts: &TimeoutConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&crm.base_url())?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: crm.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path like `/customers/create` against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &EncodedRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        async move {
            let url = self.url_for(&request.path)?;
            let mut builder = self
                .client
                .request(request.method.clone(), url)
                .header(API_KEY_HEADER, &self.api_key);

            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if request.method != Method::GET && !request.form.is_empty() {
                builder = builder.form(&request.form);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();

            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status,
                body_bytes = body.len(),
                "CRM API response received"
            );

            Ok(RawResponse { status, body })
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

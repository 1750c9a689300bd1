//! RetailCRM API client.
//!
//! # Responsibilities
//! - Expose one typed method per business operation
//! - Run every call through encode → rate limit → send → classify
//! - Retry classified failures within the call's budget
//! - Bound each logical call with a deadline

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

use crate::config::GatewayConfig;
use crate::crm::encoder::{encode, EncodedRequest, RequestDescriptor};
use crate::crm::envelope::{classify_attempt, decode_payload};
use crate::crm::error::CrmResult;
use crate::crm::operations;
use crate::crm::transport::{HttpTransport, Transport};
use crate::crm::types::{
    Created, CustomerFilter, CustomerOrdersQuery, CustomersPage, NewCustomer, NewOrder,
    NewPayment, OrdersPage,
};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::resilience::{RateLimiter, RetryBudget, RetryController};

/// Client for one CRM account. Create once and share behind an `Arc`.
pub struct CrmClient<T: Transport = HttpTransport> {
    transport: T,
    rate_limiter: Option<RateLimiter>,
    retries: RetryController,
    call_deadline: Duration,
    site: String,
}

impl CrmClient<HttpTransport> {
    /// Build a client with the reqwest transport.
    pub fn from_config(config: &GatewayConfig) -> CrmResult<Self> {
        let transport = HttpTransport::new(&config.crm, &config.timeouts)?;
        tracing::info!(
            base_url = %transport.base_url(),
            rate_limit_enabled = config.rate_limit.enabled,
            capacity = config.rate_limit.capacity,
            period_ms = config.rate_limit.period_ms,
            max_retries = config.retries.max_retries,
            "CRM client initialized"
        );
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> CrmClient<T> {
    pub fn with_transport(transport: T, config: &GatewayConfig) -> Self {
        Self {
            transport,
            rate_limiter: RateLimiter::from_config(&config.rate_limit),
            retries: RetryController::new(config.retries.clone()),
            call_deadline: Duration::from_secs(config.timeouts.call_secs),
            site: config.crm.site().to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a logical call and return the success envelope.
    ///
    /// `retries` overrides the configured budget for this call only.
    pub async fn call(
        &self,
        descriptor: RequestDescriptor,
        retries: Option<u32>,
    ) -> CrmResult<Map<String, Value>> {
        let label = descriptor.label();
        let encoded = encode(&descriptor);
        let budget = retries
            .map(RetryBudget::new)
            .unwrap_or_else(|| self.retries.default_budget());

        let attempts = self.retries.run(&label, budget, || self.attempt(&encoded));
        with_deadline(&label, self.call_deadline, attempts).await
    }

    async fn attempt(&self, request: &EncodedRequest) -> CrmResult<Map<String, Value>> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        tracing::info!(method = %request.method, path = %request.path, "Making CRM API request");
        let started = Instant::now();
        let result = classify_attempt(self.transport.send(request).await).into_result();

        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.kind(),
        };
        metrics::record_upstream_call(request.method.as_str(), &request.path, outcome, started.elapsed());

        result
    }

    async fn call_typed<R: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> CrmResult<R> {
        let payload = self.call(descriptor, None).await?;
        decode_payload(payload)
    }

    pub async fn list_customers(&self, filter: &CustomerFilter) -> CrmResult<CustomersPage> {
        self.call_typed(operations::list_customers(filter)?).await
    }

    pub async fn create_customer(&self, customer: &NewCustomer) -> CrmResult<Created> {
        self.call_typed(operations::create_customer(&self.site, customer)?)
            .await
    }

    pub async fn list_customer_orders(&self, query: &CustomerOrdersQuery) -> CrmResult<OrdersPage> {
        self.call_typed(operations::list_customer_orders(query)?).await
    }

    pub async fn create_order(&self, order: &NewOrder) -> CrmResult<Created> {
        self.call_typed(operations::create_order(&self.site, order)?).await
    }

    pub async fn create_payment(&self, payment: &NewPayment) -> CrmResult<Created> {
        self.call_typed(operations::create_payment(&self.site, payment)?)
            .await
    }

    /// Diagnostic call against the payment types reference. Result discarded.
    pub async fn probe(&self) -> CrmResult<()> {
        self.call(operations::payment_types(), Some(0)).await.map(|_| ())
    }
}

impl<T: Transport> std::fmt::Debug for CrmClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("site", &self.site)
            .field("rate_limited", &self.rate_limiter.is_some())
            .field("call_deadline", &self.call_deadline)
            .finish()
    }
}

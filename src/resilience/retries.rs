//! Retry loop for logical CRM calls.
//!
//! # Policy
//! - `RequestFailed` surfaces on first occurrence, budget untouched
//! - Every other failure is retried while budget remains
//! - Attempts are sequential; each re-issues the whole call, rate limit included
//! - Optional backoff between attempts (see `backoff.rs`)

use std::future::Future;

use crate::config::RetryConfig;
use crate::crm::error::CrmError;
use crate::observability::metrics;
use crate::resilience::backoff::backoff_delay;

/// Retries left for one logical call. Never replenished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    pub fn new(retries: u32) -> Self {
        Self { remaining: retries }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Take one retry. Returns false once the budget is spent.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Bounded retry wrapper around one logical call.
#[derive(Debug, Clone)]
pub struct RetryController {
    config: RetryConfig,
}

impl RetryController {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn default_budget(&self) -> RetryBudget {
        RetryBudget::new(self.config.max_retries)
    }

    /// Run `attempt` until it succeeds, fails finally, or the budget runs out.
    ///
    /// `label` identifies the call in logs (e.g. `"GET /customers"`).
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        mut budget: RetryBudget,
        mut attempt: F,
    ) -> Result<T, CrmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CrmError>>,
    {
        let mut retry = 0u32;
        loop {
            let err = match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                tracing::error!(call = %label, error = %err, "CRM API request failed");
                return Err(err);
            }

            if !budget.try_consume() {
                tracing::error!(
                    call = %label,
                    attempts = retry + 1,
                    error = %err,
                    "CRM API request failed, retries exhausted"
                );
                return Err(err);
            }

            retry += 1;
            metrics::record_retry(label, err.kind());
            let delay = backoff_delay(retry, &self.config);
            tracing::warn!(
                call = %label,
                retry,
                remaining = budget.remaining(),
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "CRM API request failed. Retrying..."
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

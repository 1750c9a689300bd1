//! Deadline for a whole logical call.
//!
//! Per-attempt connect/read timeouts live in the transport. This bounds the
//! sum of rate-limit waits, attempts and backoff, which is otherwise unbounded.

use std::future::Future;
use std::time::Duration;

use crate::crm::error::CrmError;

/// Run `call`, failing with a transport error once `deadline` passes.
pub async fn with_deadline<T, Fut>(label: &str, deadline: Duration, call: Fut) -> Result<T, CrmError>
where
    Fut: Future<Output = Result<T, CrmError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(call = %label, deadline_secs = deadline.as_secs_f64(), "CRM API call deadline exceeded");
            Err(CrmError::Transport(format!(
                "deadline of {:.1}s exceeded",
                deadline.as_secs_f64()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline("GET /x", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_deadline_exceeded_is_transport_failure() {
        let result: Result<(), _> = with_deadline("GET /x", Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(CrmError::Transport(msg)) if msg.contains("deadline")));
    }
}

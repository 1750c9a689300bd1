//! Failure taxonomy for upstream CRM calls.

use thiserror::Error;

/// A classified failure of a logical CRM call.
///
/// `RequestFailed` is the only non-retryable kind. The inbound layer maps
/// each variant to its own response; nothing here knows about HTTP framing
/// towards the gateway's own callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrmError {
    /// Upstream answered 503.
    #[error("CRM service temporarily unavailable")]
    ServiceUnavailable,

    /// Envelope without a usable `success` flag.
    #[error("CRM response violates envelope protocol: {0}")]
    ProtocolViolation(String),

    /// `success: false` with a 4xx status.
    #[error("CRM rejected request input: {0}")]
    InvalidInput(String),

    /// `success: false` with any other status.
    #[error("CRM request failed: {0}")]
    RequestFailed(String),

    /// Network error, timeout, unreadable body or undecodable payload.
    #[error("CRM transport failure: {0}")]
    Transport(String),
}

impl CrmError {
    /// Whether the retry loop may re-issue the call.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CrmError::RequestFailed(_))
    }

    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CrmError::ServiceUnavailable => "service_unavailable",
            CrmError::ProtocolViolation(_) => "protocol_violation",
            CrmError::InvalidInput(_) => "invalid_input",
            CrmError::RequestFailed(_) => "request_failed",
            CrmError::Transport(_) => "transport_failure",
        }
    }
}

/// Errors raised while issuing one physical HTTP request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<TransportError> for CrmError {
    fn from(err: TransportError) -> Self {
        CrmError::Transport(err.to_string())
    }
}

pub type CrmResult<T> = Result<T, CrmError>;

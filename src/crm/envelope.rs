//! Response envelope interpretation.
//!
//! Every upstream response is `{"success": bool, "errorMsg"?, "errors"?, ...payload}`.
//!
//! | Condition                                  | Classification     |
//! |--------------------------------------------|--------------------|
//! | status 503                                 | ServiceUnavailable |
//! | body not JSON / transport error            | Transport          |
//! | no boolean `success`                       | ProtocolViolation  |
//! | `success: false`, status 4xx               | InvalidInput       |
//! | `success: false`, other status             | RequestFailed      |
//! | `success: true`                            | Success(payload)   |

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::crm::error::{CrmError, CrmResult, TransportError};

/// Status and body of one physical response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The envelope object, `success` flag included.
    Success(Map<String, Value>),
    Failure(CrmError),
}

impl Classification {
    pub fn into_result(self) -> CrmResult<Map<String, Value>> {
        match self {
            Classification::Success(payload) => Ok(payload),
            Classification::Failure(err) => Err(err),
        }
    }
}

/// Classify the result of a transport call.
pub fn classify_attempt(result: Result<RawResponse, TransportError>) -> Classification {
    match result {
        Ok(response) => classify(&response),
        Err(err) => Classification::Failure(err.into()),
    }
}

/// Classify a raw upstream response.
pub fn classify(response: &RawResponse) -> Classification {
    if response.status == 503 {
        return Classification::Failure(CrmError::ServiceUnavailable);
    }

    let envelope = match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Classification::Failure(CrmError::ProtocolViolation(
                "response body is not a JSON object".to_string(),
            ))
        }
        Err(e) => {
            return Classification::Failure(CrmError::Transport(format!(
                "malformed response body (status {}): {}",
                response.status, e
            )))
        }
    };

    match envelope.get("success") {
        Some(Value::Bool(true)) => Classification::Success(envelope),
        Some(Value::Bool(false)) => {
            let message = failure_message(&envelope);
            if (400..=499).contains(&response.status) {
                Classification::Failure(CrmError::InvalidInput(message))
            } else {
                Classification::Failure(CrmError::RequestFailed(message))
            }
        }
        None | Some(Value::Null) => Classification::Failure(CrmError::ProtocolViolation(
            format!("missing 'success' field (status {})", response.status),
        )),
        Some(other) => Classification::Failure(CrmError::ProtocolViolation(format!(
            "'success' is not a boolean: {}",
            other
        ))),
    }
}

/// `"{errorMsg} {errors}"`, missing parts rendered empty.
fn failure_message(envelope: &Map<String, Value>) -> String {
    let error_msg = text_of(envelope.get("errorMsg"));
    let errors = text_of(envelope.get("errors"));
    format!("{} {}", error_msg, errors)
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Decode a success payload into a typed result, ignoring unknown fields.
///
/// Missing required fields surface as a transport failure.
pub fn decode_payload<T: DeserializeOwned>(payload: Map<String, Value>) -> CrmResult<T> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| CrmError::Transport(format!("failed to decode CRM payload: {}", e)))
}

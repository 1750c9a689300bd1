//! Mapping of gateway failures to HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::crm::CrmError;
use crate::http::validation::error_messages;

/// Errors returned by gateway handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    #[error("{0}")]
    BadRequest(String),

    #[error("Upstream request failed")]
    BadGateway(Option<String>),

    #[error("Validation failed")]
    Validation(Vec<String>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "Service temporarily unavailable".to_string(),
                None,
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::BadGateway(msg) => (
                StatusCode::BAD_GATEWAY,
                "bad_gateway",
                msg.unwrap_or_else(|| "Upstream request failed".to_string()),
                None,
            ),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CrmError> for ApiError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::ServiceUnavailable => ApiError::ServiceUnavailable,
            CrmError::InvalidInput(msg) => ApiError::BadRequest(msg),
            CrmError::RequestFailed(msg) => ApiError::BadGateway(Some(msg)),
            CrmError::ProtocolViolation(_) | CrmError::Transport(_) => ApiError::BadGateway(None),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(error_messages(&errors))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crm_error_mapping() {
        let status = |e: CrmError| ApiError::from(e).into_response().status();
        assert_eq!(status(CrmError::ServiceUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(CrmError::InvalidInput("bad ".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(CrmError::RequestFailed("x ".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status(CrmError::ProtocolViolation("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status(CrmError::Transport("x".into())), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_field_rules_map_to_unprocessable() {
        use crate::crm::types::PageParams;
        use validator::Validate;

        let page = PageParams {
            page: 0,
            ..PageParams::default()
        };
        let err = ApiError::from(page.validate().unwrap_err());
        assert!(matches!(&err, ApiError::Validation(details) if details.len() == 1));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_upstream_message_is_kept_for_client_errors() {
        match ApiError::from(CrmError::InvalidInput("bad email ".into())) {
            ApiError::BadRequest(msg) => assert_eq!(msg, "bad email "),
            other => panic!("unexpected {:?}", other),
        }
        // Transport details stay in the logs.
        assert!(matches!(
            ApiError::from(CrmError::Transport("connection refused".into())),
            ApiError::BadGateway(None)
        ));
    }
}

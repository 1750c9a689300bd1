//! Request descriptors and their wire encoding.
//!
//! Operations describe a call as named fields with optional JSON values.
//! Encoding drops absent fields and flattens every value to text: the
//! upstream only accepts scalar or text form fields, so objects and lists in
//! the body travel as JSON strings.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::crm::error::CrmError;

/// Field name paired with an optional value.
pub type Field = (String, Option<Value>);

/// One logical upstream call, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<Field>,
    pub body: Vec<Field>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add query fields from a serializable struct's top-level fields.
    pub fn with_query<T: Serialize>(mut self, fields: &T) -> Result<Self, CrmError> {
        self.query.extend(to_fields(fields)?);
        Ok(self)
    }

    /// Add body fields from a serializable struct's top-level fields.
    pub fn with_body<T: Serialize>(mut self, fields: &T) -> Result<Self, CrmError> {
        self.body.extend(to_fields(fields)?);
        Ok(self)
    }

    /// `"GET /customers"`, for logs.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

fn to_fields<T: Serialize>(fields: &T) -> Result<Vec<Field>, CrmError> {
    match serde_json::to_value(fields) {
        Ok(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(name, value)| {
                let value = if value.is_null() { None } else { Some(value) };
                (name, value)
            })
            .collect()),
        Ok(other) => Err(CrmError::Transport(format!(
            "request fields must serialize to an object, got {}",
            other
        ))),
        Err(e) => Err(CrmError::Transport(format!("failed to encode request: {}", e))),
    }
}

/// A descriptor flattened to wire-ready pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

/// Encode a descriptor. Pure: the same descriptor always yields the same output.
pub fn encode(descriptor: &RequestDescriptor) -> EncodedRequest {
    EncodedRequest {
        method: descriptor.method.clone(),
        path: descriptor.path.clone(),
        query: present(&descriptor.query),
        form: present(&descriptor.body),
    }
}

fn present(fields: &[Field]) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|(name, value)| match value {
            None | Some(Value::Null) => None,
            Some(value) => Some((name.clone(), to_text(value))),
        })
        .collect()
}

/// Scalars render as plain text, objects and lists as compact JSON.
fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

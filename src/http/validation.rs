//! Rendering of `validator` failures for API responses.
//!
//! Field rules live on the request types in `crm::types`. Here the nested
//! `ValidationErrors` tree is flattened into `path: message` lines, sorted so
//! responses are stable.

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Key `validator` uses for struct-level (schema) errors.
const SCHEMA_KEY: &str = "__all__";

pub fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect(errors, "", &mut messages);
    messages.sort();
    messages
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        let path = if field == SCHEMA_KEY {
            prefix.to_string()
        } else if prefix.is_empty() {
            field
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| describe(&path, error)));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

fn describe(path: &str, error: &ValidationError) -> String {
    let message = match error.message.as_deref() {
        Some(message) => message.to_string(),
        None => error.code.to_string(),
    };
    if path.is_empty() {
        message
    } else {
        format!("{}: {}", path, message)
    }
}

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::transport::TransportError;

/// Shown whenever the server gives us nothing structured to display.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again.";

/// Keys whose messages are shown without a field label.
const UNLABELLED_KEYS: [&str; 2] = ["detail", "non_field_errors"];

/// One line of user-facing error output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    pub label: Option<String>,
    pub text: String,
}

impl FieldMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            label: None,
            text: text.into(),
        }
    }
}

impl fmt::Display for FieldMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}: {}", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Server validation errors, `field -> messages`, in payload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    /// Decodes a JSON object payload; anything else is not a field error.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let entries = object
            .iter()
            .map(|(field, messages)| (field.clone(), flatten_messages(messages)))
            .collect();
        Some(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn messages(&self) -> Vec<FieldMessage> {
        self.entries
            .iter()
            .map(|(field, messages)| FieldMessage {
                label: if UNLABELLED_KEYS.contains(&field.as_str()) {
                    None
                } else {
                    Some(field_label(field))
                },
                text: messages.join(", "),
            })
            .collect()
    }
}

fn flatten_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_messages).collect(),
        Value::Object(map) => map.values().flat_map(flatten_messages).collect(),
        Value::Null => vec![],
        other => vec![other.to_string()],
    }
}

/// `password_confirm` -> `Password confirm`.
pub fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("request rejected with status {status}")]
    Fields { status: u16, errors: FieldErrors },
    #[error("not authorized")]
    Unauthorized,
    #[error("unexpected response status {status}")]
    Unexpected { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("request aborted")]
    Aborted,
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classifies a non-success response.
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }

        match serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(FieldErrors::from_value)
        {
            Some(errors) if !errors.is_empty() => ApiError::Fields { status, errors },
            _ => ApiError::Unexpected {
                status,
                body: body.to_string(),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Fields { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Lines to show the user for this failure.
    pub fn messages(&self) -> Vec<FieldMessage> {
        match self {
            ApiError::Validation(text) => vec![FieldMessage::plain(text.clone())],
            ApiError::Fields { errors, .. } => errors.messages(),
            ApiError::Aborted => vec![],
            ApiError::Unauthorized
            | ApiError::Unexpected { .. }
            | ApiError::Network(_)
            | ApiError::Decode(_) => vec![FieldMessage::plain(GENERIC_FAILURE)],
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Aborted => ApiError::Aborted,
            TransportError::Failed(message) => ApiError::Network(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_capitalize_and_space_every_underscore() {
        assert_eq!(field_label("password_confirm"), "Password confirm");
        assert_eq!(field_label("new_password_confirm"), "New password confirm");
        assert_eq!(field_label("email"), "Email");
        assert_eq!(field_label(""), "");
    }

    #[test]
    fn status_401_is_unauthorized_whatever_the_body() {
        assert_eq!(
            ApiError::from_response(401, r#"{"detail":"Given token not valid"}"#),
            ApiError::Unauthorized
        );
        assert_eq!(ApiError::from_response(401, ""), ApiError::Unauthorized);
    }

    #[test]
    fn object_payload_becomes_field_messages() {
        let error = ApiError::from_response(
            400,
            r#"{"email":["A user with this email already exists."],
                "password_confirm":["Passwords don't match"],
                "detail":"Invalid old password"}"#,
        );

        let errors = error.field_errors().expect("field errors");
        assert_eq!(
            errors.get("email"),
            Some(&["A user with this email already exists.".to_string()][..])
        );

        let rendered: Vec<String> = error.messages().iter().map(ToString::to_string).collect();
        assert!(rendered.contains(&"Email: A user with this email already exists.".to_string()));
        assert!(rendered.contains(&"Password confirm: Passwords don't match".to_string()));
        assert!(rendered.contains(&"Invalid old password".to_string()));
    }

    #[test]
    fn field_messages_keep_the_server_order() {
        let error = ApiError::from_response(
            400,
            r#"{"password":["This password is too short."],
                "email":["Enter a valid email address."],
                "detail":"Check the form."}"#,
        );

        let fields: Vec<&str> = error.field_errors().expect("field errors").fields().collect();
        assert_eq!(fields, vec!["password", "email", "detail"]);

        let rendered: Vec<String> = error.messages().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "Password: This password is too short.",
                "Email: Enter a valid email address.",
                "Check the form.",
            ]
        );
    }

    #[test]
    fn non_object_payload_falls_back_to_generic_message() {
        for body in ["<html>Server Error</html>", "[\"nope\"]", "", "{}"] {
            let error = ApiError::from_response(500, body);
            assert!(matches!(error, ApiError::Unexpected { status: 500, .. }));
            assert_eq!(error.messages(), vec![FieldMessage::plain(GENERIC_FAILURE)]);
        }
    }

    #[test]
    fn nested_and_scalar_values_are_flattened() {
        let error = ApiError::from_response(
            400,
            r#"{"user":{"email":["Enter a valid email address."]},"count":3,"note":null}"#,
        );
        let errors = error.field_errors().expect("field errors");
        assert_eq!(
            errors.get("user"),
            Some(&["Enter a valid email address.".to_string()][..])
        );
        assert_eq!(errors.get("count"), Some(&["3".to_string()][..]));
        assert_eq!(errors.get("note"), Some(&[][..]));
    }

    #[test]
    fn transport_failures_map_to_network_or_aborted() {
        assert_eq!(
            ApiError::from(TransportError::Failed("connection refused".to_string())),
            ApiError::Network("connection refused".to_string())
        );
        assert_eq!(ApiError::from(TransportError::Aborted), ApiError::Aborted);
        assert!(ApiError::Aborted.messages().is_empty());
    }
}

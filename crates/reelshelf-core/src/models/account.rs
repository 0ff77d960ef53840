use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Credentials returned by `POST /token/`.
#[derive(Clone, PartialEq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// Never print token material
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Payload for `POST /register/`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fields reported first, in the order the registration form shows them
const FIELD_ORDER: [&str; 3] = ["username", "email", "password"];

/// Per-field validation messages (`{"username": ["already exists"], ...}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Parse a validation payload. Values may be a list of messages or a
    /// single string; anything else is ignored.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let mut fields = BTreeMap::new();
        if let Some(object) = value.as_object() {
            for (field, messages) in object {
                let messages: Vec<String> = match messages {
                    serde_json::Value::String(s) => vec![s.clone()],
                    serde_json::Value::Array(items) => items
                        .iter()
                        .filter_map(|m| m.as_str().map(str::to_string))
                        .collect(),
                    _ => continue,
                };
                if !messages.is_empty() {
                    fields.insert(field.clone(), messages);
                }
            }
        }
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message to show: form fields in display order, then any other.
    pub fn first_message(&self) -> Option<(&str, &str)> {
        FIELD_ORDER
            .iter()
            .filter_map(|field| self.0.get_key_value(*field))
            .chain(self.0.iter().filter(|(k, _)| !FIELD_ORDER.contains(&k.as_str())))
            .find_map(|(field, messages)| {
                messages.first().map(|m| (field.as_str(), m.as_str()))
            })
    }
}

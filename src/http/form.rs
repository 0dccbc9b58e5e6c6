//! Request body decoding module
//!
//! Decodes form submissions into flat name/value pairs. HTMX posts
//! `application/x-www-form-urlencoded` by default; API clients may send a
//! JSON object instead.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("JSON body must be an object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Decoded form fields; a repeated field keeps its last value
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    /// Decode `body` according to its `Content-Type`
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Self, FormError> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        if content_type.is_some_and(is_json) {
            Self::from_json(body)
        } else {
            Ok(Self::from_urlencoded(body))
        }
    }

    pub fn from_urlencoded(body: &[u8]) -> Self {
        let fields = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { fields }
    }

    pub fn from_json(body: &[u8]) -> Result<Self, FormError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        let serde_json::Value::Object(map) = value else {
            return Err(FormError::NotAnObject);
        };

        let fields = map
            .into_iter()
            .filter_map(|(k, v)| {
                let text = match v {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((k, text))
            })
            .collect();
        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Field value, or an empty string when absent
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// Field parsed as a floating point number
    pub fn number(&self, name: &'static str) -> Result<f64, FormError> {
        let raw = self.get(name).ok_or(FormError::MissingField(name))?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| FormError::InvalidNumber {
                field: name,
                value: raw.to_string(),
            })
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

//! Plugin submission records as they appear in the registry document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A plugin submission record.
///
/// Registry documents carry flat string fields. `change_request_number` is
/// absent until attribution and is emitted as `pr_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub repo: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(
        rename = "pr_number",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub change_request_number: Option<u64>,
}

impl Entry {
    /// Build an unattributed entry. Mostly useful for tests and fakes.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author: String::new(),
            repo: repo.into(),
            description: String::new(),
            change_request_number: None,
        }
    }

    /// Parse one record of a registry document.
    ///
    /// Returns `None` for anything that is not an object with a non-empty
    /// string `id`. Optional fields that are null or not strings read as
    /// empty.
    pub fn from_record(record: &Value) -> Option<Self> {
        let obj = record.as_object()?;
        match obj.get("id") {
            Some(Value::String(id)) if !id.is_empty() => {}
            _ => return None,
        }
        serde_json::from_value(record.clone()).ok()
    }

    /// Lower-cased first path segment of `repo`, e.g. `alice` for
    /// `Alice/foo-plugin`. Empty when `repo` is empty.
    pub fn owner(&self) -> String {
        self.repo
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    /// Return a copy attributed to change-request `number`.
    pub fn attributed_to(&self, number: u64) -> Self {
        Self {
            change_request_number: Some(number),
            ..self.clone()
        }
    }
}

/// Null and non-string values read as an empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Parse a registry document into a JSON array of raw records.
///
/// Fails only when the document itself is not a JSON array; individual
/// records are validated later by [`Entry::from_record`].
pub fn parse_document(content: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(records)) => Ok(records),
        Ok(other) => Err(format!("expected a JSON array, found {}", kind_of(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

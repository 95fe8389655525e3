//! Argument bag validation.
//!
//! Required arguments fail with a validation error; tuning knobs such as
//! `max_lines` are lenient and fall back to a default instead.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

pub struct Args<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Present and not null.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    /// Whether the key is present with a non-null value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Non-empty string, trimmed.
    pub fn required_str(&self, key: &str) -> Result<String> {
        match self.get(key) {
            None => Err(missing(key)),
            Some(Value::String(s)) if s.trim().is_empty() => Err(BridgeError::Validation(
                format!("{} cannot be empty or whitespace", key),
            )),
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            Some(other) => Err(wrong_type(key, "a string", other)),
        }
    }

    /// Trimmed string when present; blank counts as absent.
    pub fn optional_str(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let s = s.trim();
                Ok((!s.is_empty()).then(|| s.to_string()))
            }
            Some(other) => Err(wrong_type(key, "a string", other)),
        }
    }

    /// Non-negative integer; numeric strings are accepted.
    pub fn build_number(&self, key: &str) -> Result<u64> {
        let value = self.get(key).ok_or_else(|| missing(key))?;
        let number = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            BridgeError::Validation(format!("{} must be an integer, got: {}", key, value))
        })?;

        u64::try_from(number).map_err(|_| {
            BridgeError::Validation(format!("{} must be non-negative, got: {}", key, number))
        })
    }

    /// XML document text; must start with `<` once trimmed.
    pub fn config_xml(&self, key: &str) -> Result<String> {
        let xml = self.required_str(key)?;
        if !xml.starts_with('<') {
            return Err(BridgeError::Validation(format!(
                "{} must be valid XML (should start with '<')",
                key
            )));
        }
        Ok(xml)
    }

    /// JSON object when present.
    pub fn object(&self, key: &str) -> Result<Option<Map<String, Value>>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(other) => Err(wrong_type(key, "an object", other)),
        }
    }

    pub fn required_object(&self, key: &str) -> Result<Map<String, Value>> {
        self.object(key)?.ok_or_else(|| missing(key))
    }

    /// Booleans, or strings like `"true"`/`"1"`/`"yes"`.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            Some(_) => default,
        }
    }

    /// Integer clamped into `range`; unparseable values give `default`.
    pub fn clamped(&self, key: &str, range: RangeInclusive<i64>, default: i64) -> i64 {
        let parsed = match self.get(key) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        parsed
            .unwrap_or(default)
            .clamp(*range.start(), *range.end())
    }
}

fn missing(key: &str) -> BridgeError {
    BridgeError::Validation(format!("Missing required argument: {}", key))
}

fn wrong_type(key: &str, expected: &str, value: &Value) -> BridgeError {
    BridgeError::Validation(format!(
        "{} must be {}, got {}",
        key,
        expected,
        type_name(value)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

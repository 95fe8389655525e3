//! Job configuration XML helpers.

use serde_json::Value;

use crate::error::BridgeError;

/// Elements that name other jobs and must follow a copy or rename.
const JOB_REFERENCE_TAGS: [&str; 2] = ["projectName", "projectFullName"];

/// Rewrites `<projectName>`/`<projectFullName>` elements whose text is exactly
/// `old_name`.
pub fn rename_job_references(config_xml: &str, old_name: &str, new_name: &str) -> String {
    let (old, new) = (escape(old_name), escape(new_name));
    JOB_REFERENCE_TAGS
        .iter()
        .fold(config_xml.to_string(), |xml, tag| {
            xml.replace(
                &format!("<{tag}>{old}</{tag}>"),
                &format!("<{tag}>{new}</{tag}>"),
            )
        })
}

/// Builds a job config from JSON: objects become child elements, arrays
/// become `<item>` children, scalars become text.
pub fn json_to_config_xml(root_tag: &str, data: &Value) -> Result<String, BridgeError> {
    let mut out = String::new();
    write_element(&mut out, root_tag, data)?;
    Ok(out)
}

fn write_element(out: &mut String, tag: &str, value: &Value) -> Result<(), BridgeError> {
    if !is_valid_name(tag) {
        return Err(BridgeError::Validation(format!(
            "'{}' is not a valid XML element name",
            tag
        )));
    }

    let mut body = String::new();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_element(&mut body, key, child)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                write_element(&mut body, "item", item)?;
            }
        }
        Value::Null => {}
        Value::String(s) => body.push_str(&escape(s)),
        other => body.push_str(&other.to_string()),
    }

    if body.is_empty() {
        out.push_str(&format!("<{tag} />"));
    } else {
        out.push_str(&format!("<{tag}>{body}</{tag}>"));
    }
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !name.to_lowercase().starts_with("xml")
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

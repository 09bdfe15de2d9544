//! Secret masking for captured request bodies.

use serde_json::Value;

const REDACTED: &str = "[REDACTED]";

/// Field names whose values never reach the audit trail.
const SECRET_FIELDS: &[&str] = &[
    "password",
    "new_password",
    "old_password",
    "current_password",
    "token",
    "secret",
];

/// Masks secret fields of a JSON body at any depth.
///
/// Non-JSON bodies are returned unchanged.
pub fn redact_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(mut value) => {
            if redact_value(&mut value) {
                value.to_string()
            } else {
                body.to_string()
            }
        }
        Err(_) => body.to_string(),
    }
}

/// Returns true if anything was masked.
fn redact_value(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => {
            let mut changed = false;
            for (key, field) in map.iter_mut() {
                if SECRET_FIELDS.contains(&key.to_ascii_lowercase().as_str()) {
                    *field = Value::String(REDACTED.to_string());
                    changed = true;
                } else {
                    changed |= redact_value(field);
                }
            }
            changed
        }
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |changed, item| redact_value(item) | changed),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_masks_nested_secrets() {
        let body = json!({
            "username": "carol",
            "password": "hunter2",
            "profile": { "Token": "abc" },
            "items": [{ "secret": "s" }]
        })
        .to_string();

        let redacted: Value = serde_json::from_str(&redact_body(&body)).unwrap();

        assert_eq!(redacted["username"], "carol");
        assert_eq!(redacted["password"], REDACTED);
        assert_eq!(redacted["profile"]["Token"], REDACTED);
        assert_eq!(redacted["items"][0]["secret"], REDACTED);
    }

    #[test]
    fn test_untouched_bodies_keep_formatting() {
        let body = "{ \"resource_type\": \"gpu\" }";
        assert_eq!(redact_body(body), body);
        assert_eq!(redact_body("plain text"), "plain text");
        assert_eq!(redact_body(""), "");
    }
}

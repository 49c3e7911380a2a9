use serde_json::{Map, Value};

/// Lease data supplied with a request: an opaque mapping from field names to
/// scalar values. No schema is enforced; every consumer substitutes the empty
/// string for absent or null keys, so conditional template regions driven by
/// emptiness collapse correctly.
#[derive(Debug, Clone, Default)]
pub struct LeaseData(Map<String, Value>);

impl LeaseData {
    pub fn new(fields: Map<String, Value>) -> Self {
        LeaseData(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The value under `key` stringified, or the empty string when the key is
    /// absent or null.
    pub fn text(&self, key: &str) -> String {
        self.0.get(key).map(stringify).unwrap_or_default()
    }

    /// Lease identifier used to scope the storage key, when the caller
    /// supplied one.
    pub fn lease_id(&self) -> Option<String> {
        self.0
            .get("lease_id")
            .map(stringify)
            .filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Render a scalar JSON value the way it should appear in a document.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness for conditional template sections: null, `false`, zero and the
/// empty string all collapse the section.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Checkbox semantics are narrower than general truthiness: only the exact
/// values `true`, `"true"`, `"X"` and `"Yes"` check the box. Any other
/// non-empty value leaves it unchecked.
pub fn is_checked(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.as_str(), "true" | "X" | "Yes"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> LeaseData {
        let Value::Object(map) = json!({
            "tenant1_name": "John Smith",
            "monthly_rent": 2500,
            "pets_allowed": true,
            "tenant2_name": "",
            "agent_name": null,
        }) else {
            unreachable!()
        };
        LeaseData::new(map)
    }

    #[test]
    fn text_stringifies_scalars() {
        let data = data();
        assert_eq!(data.text("tenant1_name"), "John Smith");
        assert_eq!(data.text("monthly_rent"), "2500");
        assert_eq!(data.text("pets_allowed"), "true");
    }

    #[test]
    fn absent_and_null_render_empty() {
        let data = data();
        assert_eq!(data.text("agent_name"), "");
        assert_eq!(data.text("no_such_field"), "");
    }

    #[test]
    fn truthiness_collapses_empty_values() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("Jane")));
        assert!(is_truthy(&json!(12)));
    }

    #[test]
    fn checkbox_values() {
        assert!(is_checked(&json!(true)));
        assert!(is_checked(&json!("true")));
        assert!(is_checked(&json!("X")));
        assert!(is_checked(&json!("Yes")));
        assert!(!is_checked(&json!("yes")));
        assert!(!is_checked(&json!("no")));
        assert!(!is_checked(&json!(1)));
        assert!(!is_checked(&json!("")));
    }
}

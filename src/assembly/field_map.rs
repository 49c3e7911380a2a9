use std::collections::HashMap;

use serde_json::Value;

use crate::core::LeaseData;

/// Prefix marking an override entry as a literal value rather than a data
/// key. `"literal:Month-to-month"` fills the field with `Month-to-month`
/// without consulting the lease data at all.
pub const LITERAL_PREFIX: &str = "literal:";

/// Reconcile a PDF form field name against the lease data.
///
/// Resolution order:
/// 1. explicit override entry (honoring the `literal:` prefix);
/// 2. exact key match;
/// 3. camel-case transform of the field name (`"Tenant 1 Name"` →
///    `"tenant1Name"`) looked up again;
/// 4. otherwise `None`; unmapped fields are skipped silently, optional
///    fields are common.
pub fn resolve_field(
    field_name: &str,
    data: &LeaseData,
    overrides: Option<&HashMap<String, String>>,
) -> Option<Value> {
    if let Some(mapped) = overrides.and_then(|o| o.get(field_name)) {
        if let Some(literal) = mapped.strip_prefix(LITERAL_PREFIX) {
            return Some(Value::String(literal.to_string()));
        }
        return data.get(mapped).cloned();
    }

    if let Some(value) = data.get(field_name) {
        return Some(value.clone());
    }

    data.get(&camel_case(field_name)).cloned()
}

/// Convert a space/underscore/hyphen-separated field name into a single
/// camel-style identifier.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut first_word = true;
    for word in name.split(|c: char| c == ' ' || c == '_' || c == '-') {
        if word.is_empty() {
            continue;
        }
        let lower = word.to_lowercase();
        if first_word {
            out.push_str(&lower);
            first_word = false;
        } else {
            let mut chars = lower.chars();
            if let Some(head) = chars.next() {
                out.extend(head.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

//! Placeholder substitution for values that must not leave the machine.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::analysis::Value;

use super::hash::sha256_hex;

/// Table key: values compare by content, so two identical object literals
/// written in different places share one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RawValue {
    Text(String),
    Number(u64),
    Boolean(bool),
    Null,
    Undefined,
    Complex(String),
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => RawValue::Text(s.clone()),
            Value::Number(n) => RawValue::Number(n.to_bits()),
            Value::Boolean(b) => RawValue::Boolean(*b),
            Value::Null => RawValue::Null,
            Value::Undefined => RawValue::Undefined,
            Value::Complex(raw) => RawValue::Complex(raw.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct TableState {
    placeholders: HashMap<RawValue, String>,
    counter: usize,
    digests: HashMap<String, String>,
}

/// Run-scoped memo of raw value → placeholder and raw text → digest.
///
/// Placeholders are `[redactedN]` with `N` counting up from 0 in first-seen
/// order. Numbering depends on which file reaches a value first, so it is
/// only stable within one run.
#[derive(Debug, Default)]
pub struct SubstitutionTable {
    state: Mutex<TableState>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn placeholder_for(&self, raw: RawValue) -> String {
        let mut state = self.lock();
        if let Some(existing) = state.placeholders.get(&raw) {
            return existing.clone();
        }
        let placeholder = format!("[redacted{}]", state.counter);
        state.counter += 1;
        state.placeholders.insert(raw, placeholder.clone());
        placeholder
    }

    /// Placeholder for a value.
    pub fn placeholder(&self, value: &Value) -> String {
        self.placeholder_for(RawValue::from(value))
    }

    /// Placeholder for a bare string such as an attribute name.
    pub fn placeholder_for_text(&self, text: &str) -> String {
        self.placeholder_for(RawValue::Text(text.to_string()))
    }

    /// Memoized SHA-256 hex digest of `text`.
    pub fn digest(&self, text: &str) -> String {
        let mut state = self.lock();
        state
            .digests
            .entry(text.to_string())
            .or_insert_with(|| sha256_hex(text))
            .clone()
    }

    /// Number of placeholders handed out.
    pub fn len(&self) -> usize {
        self.lock().counter
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn redact_value(value: &Value, allowed_values: &[String], table: &SubstitutionTable) -> Value {
    match value {
        Value::String(s) if allowed_values.iter().any(|a| a == s) => value.clone(),
        Value::String(_) | Value::Complex(_) => Value::String(table.placeholder(value)),
        _ => value.clone(),
    }
}

/// Redact a key/value map against allow-lists.
///
/// An entry whose key is not allowed has both key and value replaced. For
/// the remaining entries, strings not on `allowed_values` and all complex
/// values are replaced; numbers, booleans, `null` and `undefined` pass.
pub fn substitute(
    entries: &[(String, Value)],
    allowed_keys: &[String],
    allowed_values: &[String],
    table: &SubstitutionTable,
) -> Vec<(String, Value)> {
    entries
        .iter()
        .map(|(key, value)| {
            if allowed_keys.iter().any(|k| k == key) {
                (key.clone(), redact_value(value, allowed_values, table))
            } else {
                (
                    table.placeholder_for_text(key),
                    Value::String(table.placeholder(value)),
                )
            }
        })
        .collect()
}

/// Redact positional values, such as call arguments.
pub fn substitute_values(
    values: &[Value],
    allowed_values: &[String],
    table: &SubstitutionTable,
) -> Vec<Value> {
    values
        .iter()
        .map(|value| redact_value(value, allowed_values, table))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    fn allowed(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_same_value_same_placeholder() {
        let table = SubstitutionTable::new();
        let a = table.placeholder(&text("secret"));
        let b = table.placeholder(&text("secret"));
        assert_eq!(a, b);
        assert_eq!(a, "[redacted0]");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_distinct_values_never_collide() {
        let table = SubstitutionTable::new();
        let values = [
            text("1"),
            Value::Number(1.0),
            Value::Complex("1".to_string()),
            Value::Boolean(true),
            text("true"),
        ];
        let placeholders: Vec<_> = values.iter().map(|v| table.placeholder(v)).collect();
        for (i, a) in placeholders.iter().enumerate() {
            for b in &placeholders[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_identical_objects_collide() {
        let table = SubstitutionTable::new();
        let a = table.placeholder(&Value::Complex("{ a: 1 }".to_string()));
        let b = table.placeholder(&Value::Complex("{ a: 1 }".to_string()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_substitute_rules() {
        let table = SubstitutionTable::new();
        let entries = vec![
            ("kind".to_string(), text("primary")),
            ("label".to_string(), text("Buy now")),
            ("size".to_string(), Value::Number(2.0)),
            ("onClick".to_string(), Value::Complex("handle".to_string())),
            ("data-user".to_string(), text("alice")),
        ];
        let out = substitute(
            &entries,
            &allowed(&["kind", "label", "size", "onClick"]),
            &allowed(&["primary"]),
            &table,
        );

        assert_eq!(out[0], ("kind".to_string(), text("primary")));
        assert_eq!(out[1].0, "label");
        assert_eq!(out[1].1, text("[redacted0]"));
        assert_eq!(out[2], ("size".to_string(), Value::Number(2.0)));
        assert_eq!(out[3].1, text("[redacted1]"));
        assert_eq!(out[4].0, "[redacted2]");
        assert_eq!(out[4].1, text("[redacted3]"));
    }

    #[test]
    fn test_substitute_is_consistent_across_calls() {
        let table = SubstitutionTable::new();
        let entries = vec![("label".to_string(), text("Buy now"))];
        let keys = allowed(&["label"]);
        let first = substitute(&entries, &keys, &[], &table);
        let second = substitute(&entries, &keys, &[], &table);
        assert_eq!(first, second);
    }

    #[test]
    fn test_substitute_values() {
        let table = SubstitutionTable::new();
        let out = substitute_values(
            &[text("short"), text("long"), Value::Null],
            &allowed(&["short"]),
            &table,
        );
        assert_eq!(out, vec![text("short"), text("[redacted0]"), Value::Null]);
    }

    #[test]
    fn test_digest_is_memoized_and_stable() {
        let table = SubstitutionTable::new();
        assert_eq!(table.digest("app"), table.digest("app"));
        assert_eq!(table.digest("app"), sha256_hex("app"));
        assert_ne!(table.digest("app"), table.digest("App"));
        assert!(table.is_empty());
    }
}

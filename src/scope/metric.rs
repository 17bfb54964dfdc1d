//! Captured metric records and where they go.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;

/// One attribute value of a metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Strings(Vec<String>),
    Number(f64),
    Boolean(bool),
    /// Serialized as `null`.
    Undefined,
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(items: Vec<String>) -> Self {
        AttributeValue::Strings(items)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

/// Flat attribute map of a metric, ordered by key.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A counter increment for one resolved usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub attributes: Attributes,
}

impl Metric {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Receives every captured metric. Called from concurrent file tasks.
pub trait MetricSink: Send + Sync {
    fn capture(&self, metric: Metric);
}

/// Keeps metrics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    metrics: Mutex<Vec<Metric>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far.
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl MetricSink for MemorySink {
    fn capture(&self, metric: Metric) {
        self.metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(metric);
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> MetricSink for JsonLinesSink<W> {
    fn capture(&self, metric: Metric) {
        let line = match serde_json::to_string(&metric) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(metric = %metric.name, error = %e, "failed to encode metric");
                return;
            }
        };
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(writer, "{}", line) {
            tracing::error!(error = %e, "failed to write metric");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_serializes_flat_attributes() {
        let metric = Metric::new("js.function")
            .with("js.function.name", "format")
            .with("js.function.arguments", vec!["short".to_string()])
            .with("js.function.cdn.isLatest", false)
            .with("missing", AttributeValue::Undefined);

        let json = serde_json::to_string(&metric).unwrap();
        assert_eq!(
            json,
            r#"{"name":"js.function","attributes":{"js.function.arguments":["short"],"js.function.cdn.isLatest":false,"js.function.name":"format","missing":null}}"#
        );
    }

    #[test]
    fn test_json_lines_sink() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.capture(Metric::new("a"));
        sink.capture(Metric::new("b"));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains(r#""name":"b""#));
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.capture(Metric::new("x").with("k", "v"));
        let metrics = sink.metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].attribute("k"), Some(&AttributeValue::from("v")));
    }
}

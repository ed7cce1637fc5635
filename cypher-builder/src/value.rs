use indexmap::IndexMap;
use serde::Serialize;

/// A value carried by a query parameter or rendered as an inline literal.
///
/// Request literals arrive as JSON, so the conversion from
/// [`serde_json::Value`] is lossless; maps keep insertion order to keep the
/// rendered parameter payload deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CypherValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<CypherValue>),
    Map(IndexMap<String, CypherValue>),
}

impl CypherValue {
    /// Inline literal rendering, used for the few places a literal is
    /// preferable to a parameter (boolean identities, `__typename` tags).
    pub fn render(&self, out: &mut String) {
        match self {
            CypherValue::Null => out.push_str("NULL"),
            CypherValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            CypherValue::Int(i) => out.push_str(&i.to_string()),
            CypherValue::Float(f) => out.push_str(&f.to_string()),
            CypherValue::String(s) => {
                out.push('"');
                out.push_str(&s.replace('\\', "\\\\").replace('"', "\\\""));
                out.push('"');
            }
            CypherValue::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render(out);
                }
                out.push(']');
            }
            CypherValue::Map(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    value.render(out);
                }
                out.push('}');
            }
        }
    }
}

impl From<serde_json::Value> for CypherValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CypherValue::Null,
            serde_json::Value::Bool(b) => CypherValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CypherValue::Int(i),
                None => CypherValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => CypherValue::String(s),
            serde_json::Value::Array(items) => {
                CypherValue::List(items.into_iter().map(CypherValue::from).collect())
            }
            serde_json::Value::Object(map) => CypherValue::Map(
                map.into_iter().map(|(k, v)| (k, CypherValue::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for CypherValue {
    fn from(value: &str) -> Self {
        CypherValue::String(value.to_owned())
    }
}

impl From<String> for CypherValue {
    fn from(value: String) -> Self {
        CypherValue::String(value)
    }
}

impl From<i64> for CypherValue {
    fn from(value: i64) -> Self {
        CypherValue::Int(value)
    }
}

impl From<bool> for CypherValue {
    fn from(value: bool) -> Self {
        CypherValue::Bool(value)
    }
}

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A primitive cell value. A key missing from a [`Record`] is the
/// "undefined" case and is handled separately from `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String form used for searching, filtering and default rendering.
    /// `Null` renders as the empty string.
    pub fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Text(s) => s.clone(),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Text(_) => 3,
        }
    }

    /// Natural ordering between two non-null values. Numbers compare
    /// numerically across `Int`/`Float`; mismatched types order by kind.
    pub fn natural_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }

    /// Converts a JSON scalar. Arrays and objects are not primitive and
    /// collapse to their JSON text.
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }
}

// Integral floats print without a fraction ("10", not "10.0").
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One row of tabular data, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    /// Builds a record from a flat JSON object; other shapes yield `None`.
    pub fn from_json(v: &serde_json::Value) -> Option<Record> {
        let obj = v.as_object()?;
        let mut rec = Record::new();
        for (k, v) in obj {
            rec.insert(k, Value::from_json(v));
        }
        Some(rec)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Display string of a possibly-absent field.
pub fn display_of(value: Option<&Value>) -> String {
    value.map(Value::display).unwrap_or_default()
}

/// Absent, `Null` and `""` are empty. Whitespace-only text is a value.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(v) => v.display().is_empty(),
    }
}

pub type CellFormatter = Arc<dyn Fn(Option<&Value>, &Record) -> String + Send + Sync>;

/// Static description of how one field is read, labeled, sorted and filtered.
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub header: String,
    pub sortable: bool,
    pub filterable: bool,
    pub cell: Option<CellFormatter>,
}

impl Column {
    pub fn new(key: &str, header: &str) -> Self {
        Self {
            key: key.to_string(),
            header: header.to_string(),
            sortable: false,
            filterable: false,
            cell: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn cell<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Value>, &Record) -> String + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(f));
        self
    }

    /// Formatted content for this column of `record`.
    pub fn render(&self, record: &Record) -> String {
        render_cell(self, record)
    }

    /// Parses a column descriptor from `{key, header, sortable?, filterable?}`.
    pub fn from_json(v: &serde_json::Value) -> Option<Column> {
        let key = v.get("key").and_then(|v| v.as_str())?;
        let header = v.get("header").and_then(|v| v.as_str()).unwrap_or(key);
        let mut col = Column::new(key, header);
        col.sortable = v.get("sortable").and_then(|v| v.as_bool()).unwrap_or(false);
        col.filterable = v
            .get("filterable")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Some(col)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "key": self.key,
            "header": self.header,
            "sortable": self.sortable,
            "filterable": self.filterable,
        })
    }
}

/// The column's formatter output, else the display form of the raw value.
pub fn render_cell(column: &Column, record: &Record) -> String {
    let raw = record.get(&column.key);
    match &column.cell {
        Some(f) => f(raw, record),
        None => display_of(raw),
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("cell", &self.cell.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Value::Int(10).display(), "10");
        assert_eq!(Value::Float(10.0).display(), "10");
        assert_eq!(Value::Float(9.5).display(), "9.5");
        assert_eq!(Value::Bool(true).display(), "true");
        assert_eq!(Value::Null.display(), "");
    }

    #[test]
    fn whitespace_text_is_not_empty() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&Value::Null)));
        assert!(is_empty_value(Some(&Value::from(""))));
        assert!(!is_empty_value(Some(&Value::from("  "))));
        assert!(!is_empty_value(Some(&Value::Int(0))));
    }

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(Value::Int(2).natural_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.0).natural_cmp(&Value::Int(3)), Ordering::Equal);
        assert_eq!(
            Value::from("apple").natural_cmp(&Value::from("banana")),
            Ordering::Less
        );
    }

    #[test]
    fn record_from_json_reads_scalars() {
        let rec = Record::from_json(&serde_json::json!({
            "name": "Ada",
            "age": 15,
            "gpa": 3.5,
            "active": true,
            "guardian": null
        }))
        .expect("object");
        assert_eq!(rec.get("name"), Some(&Value::from("Ada")));
        assert_eq!(rec.get("age"), Some(&Value::Int(15)));
        assert_eq!(rec.get("gpa"), Some(&Value::Float(3.5)));
        assert_eq!(rec.get("guardian"), Some(&Value::Null));
        assert!(rec.get("missing").is_none());
        assert!(Record::from_json(&serde_json::json!([1, 2])).is_none());
    }

    #[test]
    fn column_render_uses_formatter() {
        let rec = Record::new().with("active", true);
        let plain = Column::new("active", "Active");
        assert_eq!(plain.render(&rec), "true");
        let fancy = Column::new("active", "Status").cell(|v, _| match v {
            Some(Value::Bool(true)) => "Active".to_string(),
            _ => "Inactive".to_string(),
        });
        assert_eq!(fancy.render(&rec), "Active");
        assert_eq!(fancy.render(&Record::new()), "Inactive");
    }
}

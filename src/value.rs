use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// A dynamically shaped datum that expressions are evaluated against.
///
/// Besides the JSON shapes, values distinguish signed, unsigned and floating
/// point numbers, and have a `Record` shape for named fields that carry naming
/// tags (see [`Field::with_tag`]).
///
/// # Examples
///
/// ```
/// use verdict::Value;
/// use std::collections::HashMap;
///
/// // Scalar values
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let float = Value::Float(3.14);
/// let string = Value::String("hello".to_string());
///
/// // Collections
/// let array = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
///
/// let mut obj = HashMap::new();
/// obj.insert("key".to_string(), Value::String("value".to_string()));
/// let object = Value::Object(obj);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Signed integer
    Integer(i64),

    /// Unsigned integer, for values beyond `i64::MAX`
    Unsigned(u64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Sequence of values
    Array(Vec<Value>),

    /// Mapping with string keys
    Object(HashMap<String, Value>),

    /// Named fields, resolved through their naming tags
    Record(Record),
}

impl Value {
    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Unsigned(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Record(_) => "record",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Unsigned(_) | Value::Float(_))
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Unsigned(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of scalar values; `None` for null and collections.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Unsigned(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Record(_) => None,
        }
    }

    /// Converts any serializable host value. Struct fields appear as object
    /// keys under their serde names, so `#[serde(rename = ...)]` controls how
    /// selectors address them.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
        serde_json::to_value(value).map(Value::from)
    }

    /// Converts back to JSON. Records become objects keyed by their visible
    /// names under `tag_name`; non-finite floats become null.
    pub fn to_json(&self, tag_name: &str) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Unsigned(u) => serde_json::Value::Number((*u).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(|v| v.to_json(tag_name)).collect())
            }
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.to_json(tag_name)))
                    .collect(),
            ),
            Value::Record(record) => serde_json::Value::Object(
                record
                    .fields()
                    .iter()
                    .filter_map(|f| {
                        f.visible_name(tag_name)
                            .map(|n| (n.to_string(), f.value.to_json(tag_name)))
                    })
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Unsigned(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Unsigned(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

/// A record: an ordered set of named fields.
///
/// Records model host structs whose fields may be renamed for selectors by a
/// naming tag, the way `verdict:"name"` style annotations work.
///
/// ```
/// use verdict::{Field, Record, Value};
///
/// let service = Record::new("Service")
///     .field(Field::new("ServiceName", "web").with_tag("verdict", "name"))
///     .field(Field::new("Port", Value::Integer(8080)));
/// assert_eq!(service.fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    name: String,
    fields: Vec<Field>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Finds the field addressed as `key` under the naming tag `tag_name`.
    pub fn get(&self, key: &str, tag_name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.visible_name(tag_name) == Some(key))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    tags: BTreeMap<String, String>,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Field {
            name: name.into(),
            value: value.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Attaches a naming tag, e.g. `with_tag("verdict", "name")`.
    ///
    /// The tag value may carry options after a comma (`"name,omitempty"`);
    /// only the part before the comma is the alias. An alias of `-` hides the
    /// field from selectors.
    pub fn with_tag(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(tag.into(), value.into());
        self
    }

    pub fn tag(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// The name selectors use for this field under `tag_name`, or `None` if
    /// the field is hidden.
    pub fn visible_name(&self, tag_name: &str) -> Option<&str> {
        let alias = self
            .tag(tag_name)
            .map(|t| t.split(',').next().unwrap_or_default());
        match alias {
            Some("-") => None,
            Some(alias) if !alias.is_empty() => Some(alias),
            _ => Some(self.name.as_str()),
        }
    }
}

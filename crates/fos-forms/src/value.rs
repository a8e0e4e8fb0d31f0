//! Plain nested values produced by the hash builder

use fos_dom::FileEntry;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A built value hash: scalars, files, dense arrays and
/// insertion-ordered objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HashValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    File(FileEntry),
    Array(Vec<HashValue>),
    Object(IndexMap<String, HashValue>),
}

impl HashValue {
    /// Empty object
    pub fn object() -> Self {
        Self::Object(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<HashValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, HashValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Member of an object
    pub fn get(&self, key: &str) -> Option<&HashValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Follow a dotted path (`user.phones.0`) through objects and arrays
    pub fn get_path(&self, path: &str) -> Option<&HashValue> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |current, segment| match current {
            Self::Object(map) => map.get(segment),
            Self::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Whether this value or anything nested in it is a file
    pub fn contains_files(&self) -> bool {
        match self {
            Self::File(_) => true,
            Self::Array(items) => items.iter().any(Self::contains_files),
            Self::Object(map) => map.values().any(Self::contains_files),
            _ => false,
        }
    }

    /// Convert to JSON. Files have no JSON form and become `null`;
    /// integral numbers become JSON integers.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null | Self::File(_) => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for HashValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::File(_) => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl From<serde_json::Value> for HashValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for HashValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for HashValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for HashValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for HashValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for HashValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<FileEntry> for HashValue {
    fn from(file: FileEntry) -> Self {
        Self::File(file)
    }
}

impl From<Vec<HashValue>> for HashValue {
    fn from(items: Vec<HashValue>) -> Self {
        Self::Array(items)
    }
}

impl<T: Into<HashValue>> From<Option<T>> for HashValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

//! Substitution values and the mappings that hold them.
//!
//! A [`Value`] is what a placeholder is replaced with. Three kinds render to
//! bytes (raw bytes, text and a [`TagFunc`] callback), [`Value::Null`] renders
//! to nothing, and [`Value::Structured`] carries data that has no byte
//! rendering at all: substituting it fails with
//! [`TemplateError::UnexpectedValue`](crate::TemplateError::UnexpectedValue).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::io::{self, Write};
use std::sync::Arc;

type TagFn = dyn Fn(&mut dyn Write, &str) -> io::Result<usize> + Send + Sync;

/// A callback substitution value.
///
/// The callback receives the sink and the (trimmed) tag name, writes the
/// replacement and returns the number of bytes it wrote. It is invoked once
/// per matching tag occurrence. When it fails, whatever it already wrote to
/// the sink still counts toward the execution's byte total.
///
/// A mapping may be shared by concurrent executions, so the callback must be
/// `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use tbd_template::{execute_string, TagFunc, Value};
///
/// let mut m = HashMap::new();
/// m.insert(
///     "greet".to_string(),
///     Value::from(TagFunc::new(|w, tag| {
///         let text = format!("hello from {tag}");
///         w.write_all(text.as_bytes())?;
///         Ok(text.len())
///     })),
/// );
///
/// let s = execute_string("[greet]!", "[", "]", &m).unwrap();
/// assert_eq!(s, "hello from greet!");
/// ```
#[derive(Clone)]
pub struct TagFunc(Arc<TagFn>);

impl TagFunc {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Write, &str) -> io::Result<usize> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invokes the callback for `tag`.
    pub fn call(&self, w: &mut dyn Write, tag: &str) -> io::Result<usize> {
        (self.0)(w, tag)
    }
}

impl fmt::Debug for TagFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TagFunc(..)")
    }
}

/// A value bound to a tag name in a [`Mapping`].
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Explicitly empty. Renders to nothing, even in keep-unknown mode.
    #[default]
    Null,
    /// Raw bytes, written verbatim.
    Bytes(Vec<u8>),
    /// Text, written verbatim.
    Text(String),
    /// A callback that writes the replacement itself.
    Func(TagFunc),
    /// Nested data (a JSON array or object) with no byte rendering.
    Structured(serde_json::Value),
}

impl Value {
    /// Name of the value kind, as reported in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Func(_) => "func",
            Value::Structured(v) => json_kind(v),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Human readable rendering, used when listing variables.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Text(s) => f.write_str(s),
            Value::Func(_) => f.write_str("<func>"),
            Value::Structured(v) => write!(f, "{v}"),
        }
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<TagFunc> for Value {
    fn from(f: TagFunc) -> Self {
        Value::Func(f)
    }
}

/// Scalars become text using their JSON rendering; arrays and objects are
/// kept as [`Value::Structured`].
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => Value::Text(n.to_string()),
            other => Value::Structured(other),
        }
    }
}

/// Lookup from tag name to [`Value`].
///
/// Absence (`None`) and presence with [`Value::Null`] are distinct: only
/// absent tags are kept verbatim by the keep-unknown resolver.
pub trait Mapping {
    fn lookup(&self, tag: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Mapping for HashMap<String, Value, S> {
    fn lookup(&self, tag: &str) -> Option<&Value> {
        self.get(tag)
    }
}

impl Mapping for BTreeMap<String, Value> {
    fn lookup(&self, tag: &str) -> Option<&Value> {
        self.get(tag)
    }
}

impl<M: Mapping + ?Sized> Mapping for &M {
    fn lookup(&self, tag: &str) -> Option<&Value> {
        (**self).lookup(tag)
    }
}

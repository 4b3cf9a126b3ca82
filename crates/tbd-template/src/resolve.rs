//! Tag resolution strategies.
//!
//! A [`Resolve`] implementation decides what to write for each tag the
//! scanner finds. Three strategies ship with the crate:
//!
//! | Strategy        | Known tag        | `Null` value | Absent tag               |
//! |-----------------|------------------|--------------|--------------------------|
//! | [`Standard`]    | value            | nothing      | nothing                  |
//! | [`KeepUnknown`] | value            | nothing      | `start + name + end`     |
//! | [`Lister`]      | records the name, writes nothing                        |

use std::io::Write;

use crate::error::{Result, TemplateError};
use crate::value::{Mapping, Value};

/// Writes the replacement for a single tag occurrence.
pub trait Resolve {
    /// Writes zero or more bytes for `tag` and returns how many were written.
    fn resolve(&mut self, w: &mut dyn Write, tag: &str) -> Result<usize>;
}

/// Substitutes known tags and drops unknown ones.
#[derive(Debug, Clone, Copy)]
pub struct Standard<M> {
    mapping: M,
}

impl<M: Mapping> Standard<M> {
    pub fn new(mapping: M) -> Self {
        Self { mapping }
    }
}

impl<M: Mapping> Resolve for Standard<M> {
    fn resolve(&mut self, w: &mut dyn Write, tag: &str) -> Result<usize> {
        match self.mapping.lookup(tag) {
            Some(value) => write_value(w, tag, value),
            None => {
                tracing::trace!(tag, "unknown tag dropped");
                Ok(0)
            }
        }
    }
}

/// Substitutes known tags and writes unknown ones back with their delimiters,
/// so the output can be processed again with another mapping.
///
/// The tag name is written trimmed: `{{ name }}` comes back as `{{name}}`.
#[derive(Debug, Clone, Copy)]
pub struct KeepUnknown<'d, M> {
    mapping: M,
    start_tag: &'d str,
    end_tag: &'d str,
}

impl<'d, M: Mapping> KeepUnknown<'d, M> {
    pub fn new(mapping: M, start_tag: &'d str, end_tag: &'d str) -> Self {
        Self {
            mapping,
            start_tag,
            end_tag,
        }
    }
}

impl<M: Mapping> Resolve for KeepUnknown<'_, M> {
    fn resolve(&mut self, w: &mut dyn Write, tag: &str) -> Result<usize> {
        match self.mapping.lookup(tag) {
            Some(value) => write_value(w, tag, value),
            None => {
                tracing::trace!(tag, "unknown tag kept");
                w.write_all(self.start_tag.as_bytes())?;
                w.write_all(tag.as_bytes())?;
                w.write_all(self.end_tag.as_bytes())?;
                Ok(self.start_tag.len() + tag.len() + self.end_tag.len())
            }
        }
    }
}

/// Collects tag names in order of appearance, duplicates included.
#[derive(Debug, Clone, Default)]
pub struct Lister {
    tags: Vec<String>,
}

impl Lister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn into_tags(self) -> Vec<String> {
        self.tags
    }
}

impl Resolve for Lister {
    fn resolve(&mut self, _w: &mut dyn Write, tag: &str) -> Result<usize> {
        self.tags.push(tag.to_string());
        Ok(0)
    }
}

/// Adapts a caller closure to [`Resolve`].
pub(crate) struct FnResolver<F>(pub(crate) F);

impl<F> Resolve for FnResolver<F>
where
    F: FnMut(&mut dyn Write, &str) -> Result<usize>,
{
    fn resolve(&mut self, w: &mut dyn Write, tag: &str) -> Result<usize> {
        (self.0)(w, tag)
    }
}

impl<R: Resolve + ?Sized> Resolve for &mut R {
    fn resolve(&mut self, w: &mut dyn Write, tag: &str) -> Result<usize> {
        (**self).resolve(w, tag)
    }
}

/// Writes a mapping value for `tag`.
fn write_value(w: &mut dyn Write, tag: &str, value: &Value) -> Result<usize> {
    match value {
        Value::Null => Ok(0),
        Value::Bytes(b) => {
            w.write_all(b)?;
            Ok(b.len())
        }
        Value::Text(s) => {
            w.write_all(s.as_bytes())?;
            Ok(s.len())
        }
        Value::Func(f) => Ok(f.call(w, tag)?),
        Value::Structured(_) => Err(TemplateError::unexpected_value(tag, value.kind())),
    }
}

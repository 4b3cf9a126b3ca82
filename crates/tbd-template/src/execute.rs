//! The execution engine and its public entry points.
//!
//! Every entry point processes the raw template text on each call; nothing
//! is compiled or cached, and the template is only ever read.

use std::io::{self, Write};

use crate::error::{ExecuteError, Result, TemplateError};
use crate::pool;
use crate::resolve::{FnResolver, KeepUnknown, Lister, Resolve, Standard};
use crate::scanner::{has_start_tag, Scanner, Segment};
use crate::value::Mapping;

/// Runs `resolver` on each tag of `template`, writing literal text and
/// replacements to `w`.
///
/// Returns the total number of bytes written: literal bytes plus the count
/// each resolver call reports. Scanning stops at the first error, and the
/// returned [`ExecuteError`] carries the count written before it. A failing
/// resolver call cannot report a count, so the bytes it got into the sink
/// before failing are measured and included.
pub fn execute_with<W, R>(
    template: &str,
    start_tag: &str,
    end_tag: &str,
    w: &mut W,
    mut resolver: R,
) -> std::result::Result<u64, ExecuteError>
where
    W: Write + ?Sized,
    R: Resolve,
{
    let mut sink = Sink {
        inner: w,
        accepted: 0,
    };
    let mut written: u64 = 0;
    for segment in Scanner::new(template, start_tag, end_tag) {
        let before = sink.accepted;
        let step = match segment {
            Segment::Literal(text) => sink
                .write_all(text.as_bytes())
                .map(|()| text.len() as u64)
                .map_err(TemplateError::from),
            Segment::Tag(tag) => resolver.resolve(&mut sink, tag).map(|n| n as u64),
        };
        match step {
            Ok(n) => written += n,
            Err(err) => return Err(ExecuteError::new(written + (sink.accepted - before), err)),
        }
    }
    Ok(written)
}

/// Calls `f` on each tag of `template`; `f` writes the replacement to the
/// sink it receives and returns the number of bytes it wrote.
///
/// # Example
///
/// ```rust
/// use std::io::Write;
/// use tbd_template::execute_func;
///
/// let mut out = Vec::new();
/// let n = execute_func("Hello, [user]!", "[", "]", &mut out, |w: &mut dyn Write, tag: &str| {
///     let name = if tag == "user" { "John" } else { "?" };
///     w.write_all(name.as_bytes())?;
///     Ok(name.len())
/// })
/// .unwrap();
///
/// assert_eq!(out, b"Hello, John!");
/// assert_eq!(n, 12);
/// ```
pub fn execute_func<W, F>(
    template: &str,
    start_tag: &str,
    end_tag: &str,
    w: &mut W,
    f: F,
) -> std::result::Result<u64, ExecuteError>
where
    W: Write + ?Sized,
    F: FnMut(&mut dyn Write, &str) -> Result<usize>,
{
    execute_with(template, start_tag, end_tag, w, FnResolver(f))
}

/// Substitutes tags with values from `m`; unknown tags produce nothing.
pub fn execute<W, M>(
    template: &str,
    start_tag: &str,
    end_tag: &str,
    w: &mut W,
    m: &M,
) -> std::result::Result<u64, ExecuteError>
where
    W: Write + ?Sized,
    M: Mapping + ?Sized,
{
    execute_with(template, start_tag, end_tag, w, Standard::new(m))
}

/// Like [`execute`], but unknown tags are written back verbatim.
pub fn execute_keep_unknown<W, M>(
    template: &str,
    start_tag: &str,
    end_tag: &str,
    w: &mut W,
    m: &M,
) -> std::result::Result<u64, ExecuteError>
where
    W: Write + ?Sized,
    M: Mapping + ?Sized,
{
    execute_with(
        template,
        start_tag,
        end_tag,
        w,
        KeepUnknown::new(m, start_tag, end_tag),
    )
}

/// Runs `resolver` and returns the output as a `String`.
///
/// A template without any `start_tag` is returned as is, without running
/// the engine. Otherwise the output is built in a buffer borrowed from the
/// global [`pool`](crate::pool); the buffer goes back to the pool whether or
/// not execution succeeds. On error no text is returned.
pub fn execute_string_with<R: Resolve>(
    template: &str,
    start_tag: &str,
    end_tag: &str,
    resolver: R,
) -> Result<String> {
    if !has_start_tag(template, start_tag) {
        tracing::trace!("no start tag, template returned unchanged");
        return Ok(template.to_string());
    }

    let mut buf = pool::global().acquire();
    execute_with(template, start_tag, end_tag, &mut *buf, resolver)?;
    let text = std::str::from_utf8(&buf)?;
    Ok(text.to_string())
}

/// String-returning form of [`execute_func`].
pub fn execute_func_string<F>(template: &str, start_tag: &str, end_tag: &str, f: F) -> Result<String>
where
    F: FnMut(&mut dyn Write, &str) -> Result<usize>,
{
    execute_string_with(template, start_tag, end_tag, FnResolver(f))
}

/// String-returning form of [`execute`].
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use tbd_template::{execute_string, Value};
///
/// let mut m = HashMap::new();
/// m.insert("host".to_string(), Value::from("example.com"));
/// m.insert("bar".to_string(), Value::from(b"foobar".to_vec()));
///
/// let s = execute_string("http://{{host}}/?foo={{bar}}{{bar}}&baz={{baz}}", "{{", "}}", &m).unwrap();
/// assert_eq!(s, "http://example.com/?foo=foobarfoobar&baz=");
/// ```
pub fn execute_string<M>(template: &str, start_tag: &str, end_tag: &str, m: &M) -> Result<String>
where
    M: Mapping + ?Sized,
{
    execute_string_with(template, start_tag, end_tag, Standard::new(m))
}

/// String-returning form of [`execute_keep_unknown`].
pub fn execute_string_keep_unknown<M>(
    template: &str,
    start_tag: &str,
    end_tag: &str,
    m: &M,
) -> Result<String>
where
    M: Mapping + ?Sized,
{
    execute_string_with(
        template,
        start_tag,
        end_tag,
        KeepUnknown::new(m, start_tag, end_tag),
    )
}

/// Lists the tags of `template` in order of appearance, duplicates included.
///
/// An unclosed trailing tag is not listed.
///
/// ```rust
/// let tags = tbd_template::marks("http://{{host}}/?a={{a}}&a={{a}}", "{{", "}}");
/// assert_eq!(tags, ["host", "a", "a"]);
/// ```
pub fn marks(template: &str, start_tag: &str, end_tag: &str) -> Vec<String> {
    let mut lister = Lister::new();
    // io::sink never fails and the lister writes nothing
    if let Err(err) = execute_with(template, start_tag, end_tag, &mut io::sink(), &mut lister) {
        tracing::debug!(error = %err, "listing tags stopped early");
    }
    lister.into_tags()
}

/// Hands `?Sized` writers to resolvers as `&mut dyn Write` and keeps count
/// of the bytes the writer accepted.
struct Sink<'w, W: ?Sized> {
    inner: &'w mut W,
    accepted: u64,
}

impl<W: Write + ?Sized> Write for Sink<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.accepted += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

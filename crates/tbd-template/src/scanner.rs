//! Splits a template into literal spans and tag names.
//!
//! The scanner walks the template once, left to right:
//!
//! 1. find the next start delimiter; without one the rest is literal
//! 2. emit the text before it as a literal span
//! 3. find the next end delimiter after the start delimiter
//! 4. without one, the start delimiter and everything after it is literal
//!    and scanning stops
//! 5. otherwise the text in between, trimmed, is a tag
//!
//! A start delimiter seen again before the end delimiter is plain tag
//! content: `{un{closed}` yields the tag `un{closed`.
//!
//! Once a tag goes unclosed no further tags are recognized, even if the
//! remaining text contains complete `start ... end` pairs.

use memchr::memmem;

/// One piece of a scanned template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Text copied to the output unchanged. May be empty.
    Literal(&'t str),
    /// A tag name, trimmed of surrounding whitespace.
    Tag(&'t str),
}

/// Lazy iterator over the [`Segment`]s of a template.
///
/// Every tag is preceded by a literal span (possibly empty) and the sequence
/// always ends with a literal span, so `{{a}}{{b}}` yields
/// `Literal(""), Tag("a"), Literal(""), Tag("b"), Literal("")`.
///
/// # Example
///
/// ```rust
/// use tbd_template::{Scanner, Segment};
///
/// let segments: Vec<_> = Scanner::new("Hi {{ name }}!", "{{", "}}").collect();
/// assert_eq!(
///     segments,
///     vec![Segment::Literal("Hi "), Segment::Tag("name"), Segment::Literal("!")]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'t> {
    rest: &'t str,
    start_tag: &'t str,
    end_tag: &'t str,
    pending: Option<&'t str>,
    done: bool,
}

impl<'t> Scanner<'t> {
    /// Creates a scanner over `template`.
    ///
    /// An empty `start_tag` recognizes no tags: the whole template is a
    /// single literal span.
    pub fn new(template: &'t str, start_tag: &'t str, end_tag: &'t str) -> Self {
        Self {
            rest: template,
            start_tag,
            end_tag,
            pending: None,
            done: false,
        }
    }

    fn finish(&mut self) -> Option<Segment<'t>> {
        self.done = true;
        Some(Segment::Literal(std::mem::take(&mut self.rest)))
    }
}

impl<'t> Iterator for Scanner<'t> {
    type Item = Segment<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(tag) = self.pending.take() {
            return Some(Segment::Tag(tag));
        }
        if self.done {
            return None;
        }
        if self.start_tag.is_empty() {
            return self.finish();
        }

        let Some(start) = memmem::find(self.rest.as_bytes(), self.start_tag.as_bytes()) else {
            return self.finish();
        };

        let after_start = start + self.start_tag.len();
        let Some(len) = memmem::find(self.rest[after_start..].as_bytes(), self.end_tag.as_bytes())
        else {
            // unclosed tag: literal from the start delimiter on
            return self.finish();
        };

        let literal = &self.rest[..start];
        let tag = self.rest[after_start..after_start + len].trim();
        self.rest = &self.rest[after_start + len + self.end_tag.len()..];
        self.pending = Some(tag);
        Some(Segment::Literal(literal))
    }
}

/// Returns `true` if `template` contains at least one `start_tag`.
pub(crate) fn has_start_tag(template: &str, start_tag: &str) -> bool {
    !start_tag.is_empty() && memmem::find(template.as_bytes(), start_tag.as_bytes()).is_some()
}

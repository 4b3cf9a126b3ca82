//! Fast placeholder substitution for delimited text templates.
//!
//! `tbd-template` finds `start ... end` placeholders in a piece of text and
//! replaces them using a [`Mapping`] or a callback. It is a single pass over
//! the raw template: there is no compile step, no nesting, no escaping.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use tbd_template::{execute_string, execute_string_keep_unknown, marks, Value};
//!
//! let template = "{foo}q{unexpected}{missing}bar{foo}";
//!
//! let mut m = HashMap::new();
//! m.insert("foo".to_string(), Value::from("xxxx"));
//!
//! // Unknown tags are dropped
//! assert_eq!(execute_string(template, "{", "}", &m).unwrap(), "xxxxqbarxxxx");
//!
//! // ...or kept for a later pass
//! assert_eq!(
//!     execute_string_keep_unknown(template, "{", "}", &m).unwrap(),
//!     "xxxxq{unexpected}{missing}barxxxx"
//! );
//!
//! assert_eq!(marks(template, "{", "}"), ["foo", "unexpected", "missing", "foo"]);
//! ```
//!
//! # Tags
//!
//! A tag is the text between a start delimiter and the next end delimiter,
//! trimmed of surrounding whitespace. Delimiters are matched literally and
//! supplied on every call. A start delimiter with no end delimiter after it
//! is not an error: it and the rest of the template are copied unchanged.
//!
//! # Values
//!
//! | [`Value`]              | Output                                           |
//! |------------------------|--------------------------------------------------|
//! | `Bytes` / `Text`       | written verbatim                                 |
//! | `Func`                 | whatever the [`TagFunc`] writes                  |
//! | `Null`                 | nothing                                          |
//! | `Structured`           | error: [`TemplateError::UnexpectedValue`]        |
//!
//! # Sinks and strings
//!
//! [`execute`], [`execute_keep_unknown`] and [`execute_func`] write to any
//! [`std::io::Write`] and return the number of bytes written. Their
//! `*_string` counterparts return a `String`, built in a pooled buffer.

mod error;
mod execute;
pub mod pool;
mod resolve;
mod scanner;
mod value;

pub use error::{ExecuteError, Result, TemplateError};
pub use execute::{
    execute, execute_func, execute_func_string, execute_keep_unknown, execute_string,
    execute_string_keep_unknown, execute_string_with, execute_with, marks,
};
pub use resolve::{KeepUnknown, Lister, Resolve, Standard};
pub use scanner::{Scanner, Segment};
pub use value::{Mapping, TagFunc, Value};

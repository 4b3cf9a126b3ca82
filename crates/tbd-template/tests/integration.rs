//! Integration tests for tbd-template.
//!
//! The fixture tables run every entry point over the same set of templates,
//! with `{` / `}` delimiters and a mapping that only knows `foo`.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use tbd_template::{
    execute, execute_func, execute_func_string, execute_keep_unknown, execute_string,
    execute_string_keep_unknown, marks, pool, TagFunc, TemplateError, Value,
};

fn foo_mapping() -> HashMap<String, Value> {
    let mut m = HashMap::new();
    m.insert("foo".to_string(), Value::from("xxxx"));
    m
}

/// Cases shared by every entry point.
const COMMON: &[(&str, &str)] = &[
    ("", ""),
    ("a", "a"),
    ("abc", "abc"),
    ("{foo}", "xxxx"),
    ("a{foo}", "axxxx"),
    ("{foo}a", "xxxxa"),
    ("a{foo}bc", "axxxxbc"),
    ("{foo}{foo}", "xxxxxxxx"),
    ("{foo}bar{foo}", "xxxxbarxxxx"),
    // unclosed tag
    ("{unclosed", "{unclosed"),
    ("{{unclosed", "{{unclosed"),
    ("{un{closed", "{un{closed"),
];

const DROP_UNKNOWN: &[(&str, &str)] = &[
    ("{unknown}", ""),
    ("{foo}q{unexpected}{missing}bar{foo}", "xxxxqbarxxxx"),
];

const KEEP_UNKNOWN: &[(&str, &str)] = &[
    ("{unknown}", "{unknown}"),
    (
        "{foo}q{unexpected}{missing}bar{foo}",
        "xxxxq{unexpected}{missing}barxxxx",
    ),
];

// ============================================================================
// Fixture tables
// ============================================================================

#[test]
fn execute_func_fixtures() {
    let cases = COMMON.iter().copied().chain([
        ("{unknown}", "zz"),
        ("{foo}q{unexpected}{missing}bar{foo}", "xxxxqzzzzbarxxxx"),
    ]);
    for (template, expected) in cases {
        let mut out = Vec::new();
        execute_func(template, "{", "}", &mut out, |w: &mut dyn Write, tag: &str| {
            let text: &[u8] = if tag == "foo" { b"xxxx" } else { b"zz" };
            w.write_all(text)?;
            Ok(text.len())
        })
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            expected,
            "template={template:?}"
        );
    }
}

#[test]
fn execute_fixtures() {
    let m = foo_mapping();
    for &(template, expected) in COMMON.iter().chain(DROP_UNKNOWN) {
        let mut out = Vec::new();
        let n = execute(template, "{", "}", &mut out, &m).unwrap();
        assert_eq!(n as usize, out.len(), "template={template:?}");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            expected,
            "template={template:?}"
        );
    }
}

#[test]
fn execute_keep_unknown_fixtures() {
    let m = foo_mapping();
    for &(template, expected) in COMMON.iter().chain(KEEP_UNKNOWN) {
        let mut out = Vec::new();
        let n = execute_keep_unknown(template, "{", "}", &mut out, &m).unwrap();
        assert_eq!(n as usize, out.len(), "template={template:?}");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            expected,
            "template={template:?}"
        );
    }
}

#[test]
fn execute_string_fixtures() {
    let m = foo_mapping();
    for &(template, expected) in COMMON.iter().chain(DROP_UNKNOWN) {
        let output = execute_string(template, "{", "}", &m).unwrap();
        assert_eq!(output, expected, "template={template:?}");
    }
}

#[test]
fn execute_string_keep_unknown_fixtures() {
    let m = foo_mapping();
    for &(template, expected) in COMMON.iter().chain(KEEP_UNKNOWN) {
        let output = execute_string_keep_unknown(template, "{", "}", &m).unwrap();
        assert_eq!(output, expected, "template={template:?}");
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn marks_lists_duplicates_in_order() {
    assert_eq!(
        marks("http://{{host}}/?a={{a}}&a={{a}}", "{{", "}}"),
        ["host", "a", "a"]
    );
}

#[test]
fn marks_trims_and_skips_unclosed_trailing_tag() {
    assert_eq!(marks("{{ a }} {{b\n}} {{c", "{{", "}}"), ["a", "b"]);
    assert!(marks("no tags here", "{{", "}}").is_empty());
}

#[derive(Debug, PartialEq)]
struct Test111;

impl fmt::Display for Test111 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("test111")
    }
}

impl std::error::Error for Test111 {}

fn alice_and(b: TagFunc) -> HashMap<String, Value> {
    let mut m = HashMap::new();
    m.insert(
        "a".to_string(),
        Value::from(TagFunc::new(|w, _| {
            w.write_all(b"Alice")?;
            Ok(5)
        })),
    );
    m.insert("b".to_string(), Value::from(b));
    m
}

#[test]
fn producer_error_reaches_caller_unchanged() {
    let m = alice_and(TagFunc::new(|_, _| {
        Err(io::Error::new(io::ErrorKind::Other, Test111))
    }));

    let err = execute_string("{a} is {b}'s best friend", "{", "}", &m).unwrap_err();
    let io_err = match err {
        TemplateError::Io(e) => e,
        other => panic!("expected an io error, got {other:?}"),
    };
    assert_eq!(io_err.kind(), io::ErrorKind::Other);
    let inner = io_err
        .get_ref()
        .and_then(|e| e.downcast_ref::<Test111>())
        .expect("producer error must be propagated as is");
    assert_eq!(inner, &Test111);
}

#[test]
fn producer_error_keeps_partial_count_on_sink() {
    let m = alice_and(TagFunc::new(|_, _| {
        Err(io::Error::new(io::ErrorKind::Other, Test111))
    }));

    let mut out = Vec::new();
    let err = execute("{a} is {b}'s best friend", "{", "}", &mut out, &m).unwrap_err();
    assert_eq!(err.written(), "Alice is ".len() as u64);
    assert_eq!(out, b"Alice is ");
}

#[test]
fn producer_failing_midway_counts_its_partial_output() {
    let m = alice_and(TagFunc::new(|w, _| {
        w.write_all(b"Bo")?;
        Err(io::Error::new(io::ErrorKind::Other, Test111))
    }));

    let mut out = Vec::new();
    let err = execute("{a} is {b}'s best friend", "{", "}", &mut out, &m).unwrap_err();
    assert_eq!(out, b"Alice is Bo");
    assert_eq!(err.written(), "Alice is Bo".len() as u64);
}

#[test]
fn producer_success_fills_both_tags() {
    let m = alice_and(TagFunc::new(|w, _| {
        w.write_all(b"Bob")?;
        Ok(3)
    }));
    let s = execute_string("{a} is {b}'s best friend", "{", "}", &m).unwrap();
    assert_eq!(s, "Alice is Bob's best friend");
}

#[test]
fn func_string_error_returns_no_text() {
    let result = execute_func_string("{a} is {b}", "{", "}", |w: &mut dyn Write, tag: &str| {
        if tag == "a" {
            w.write_all(b"Alice")?;
            return Ok(5);
        }
        Err(TemplateError::unexpected_value(tag, "test"))
    });
    assert!(result.is_err());
}

#[test]
fn tag_func_writes_many_chunks() {
    let chunks: [&[u8]; 3] = [b"123", b"456", b"789"];
    let mut m = HashMap::new();
    m.insert(
        "baz".to_string(),
        Value::from(TagFunc::new(move |w, _| {
            let mut n = 0;
            for chunk in chunks {
                w.write_all(chunk)?;
                n += chunk.len();
            }
            Ok(n)
        })),
    );
    assert_eq!(
        execute_string("foo[baz]bar", "[", "]", &m).unwrap(),
        "foo123456789bar"
    );
}

#[test]
fn mixed_value_kinds() {
    let mut m = HashMap::new();
    m.insert("host".to_string(), Value::from("google.com"));
    m.insert("bar".to_string(), Value::from(b"foobar".to_vec()));
    m.insert(
        "query".to_string(),
        Value::from(TagFunc::new(|w, tag| {
            let text = format!("{tag}%3Dworld");
            w.write_all(text.as_bytes())?;
            Ok(text.len())
        })),
    );
    let s = execute_string(
        "http://{{host}}/?foo={{bar}}{{bar}}&q={{query}}&baz={{baz}}",
        "{{",
        "}}",
        &m,
    )
    .unwrap();
    assert_eq!(s, "http://google.com/?foo=foobarfoobar&q=query%3Dworld&baz=");
}

#[test]
fn null_value_collapses_in_both_modes() {
    let mut m = HashMap::new();
    m.insert("empty".to_string(), Value::Null);
    assert_eq!(execute_string("[{empty}]", "{", "}", &m).unwrap(), "[]");
    assert_eq!(
        execute_string_keep_unknown("[{empty}]", "{", "}", &m).unwrap(),
        "[]"
    );
}

#[test]
fn structured_value_fails_with_tag_and_kind() {
    let mut m = HashMap::new();
    m.insert("list".to_string(), Value::from(serde_json::json!([1, 2])));
    let err = execute_string("a{list}b", "{", "}", &m).unwrap_err();
    assert_eq!(
        err.to_string(),
        "tag=\"list\" contains unexpected value type=array. Expected bytes, text or TagFunc"
    );
}

#[test]
fn non_utf8_bytes_fail_text_variant() {
    let mut m = HashMap::new();
    m.insert("raw".to_string(), Value::from(vec![0xff, 0xfe]));
    let err = execute_string("{raw}", "{", "}", &m).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidUtf8(_)));

    // the sink variant does not care
    let mut out = Vec::new();
    execute("{raw}", "{", "}", &mut out, &m).unwrap();
    assert_eq!(out, [0xffu8, 0xfe]);
}

#[test]
fn template_without_start_tag_is_returned_unchanged() {
    let m = foo_mapping();
    for template in ["", "plain text", "only } closers }}"] {
        assert_eq!(execute_string(template, "{", "}", &m).unwrap(), template);
    }
    assert_eq!(execute_string("{{foo}}", "[", "]", &m).unwrap(), "{{foo}}");
    assert_eq!(execute_string("a{b}c", "", "}", &m).unwrap(), "a{b}c");
}

#[test]
fn same_template_with_different_mappings() {
    let template = "{{greeting}}, {{name}}";
    let mut first = HashMap::new();
    first.insert("greeting".to_string(), Value::from("Hello"));
    first.insert("name".to_string(), Value::from("World"));
    let mut second = HashMap::new();
    second.insert("greeting".to_string(), Value::from("Ciao"));

    assert_eq!(
        execute_string(template, "{{", "}}", &first).unwrap(),
        "Hello, World"
    );
    assert_eq!(
        execute_string_keep_unknown(template, "{{", "}}", &second).unwrap(),
        "Ciao, {{name}}"
    );
    assert_eq!(template, "{{greeting}}, {{name}}");
}

#[test]
fn concurrent_executions_share_a_mapping() {
    let m = std::sync::Arc::new(foo_mapping());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let m = std::sync::Arc::clone(&m);
            std::thread::spawn(move || {
                let template = format!("{i}:{{foo}}");
                execute_string(&template, "{", "}", &*m).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("{i}:xxxx"));
    }
}

#[test]
fn failed_execution_returns_a_cleared_buffer() {
    let mut m = HashMap::new();
    m.insert("list".to_string(), Value::from(serde_json::json!([1])));
    let pool = pool::global();

    assert!(execute_string("some output then {list}", "{", "}", &m).is_err());
    assert!(pool.idle() >= 1);

    let reused = pool.acquire();
    assert!(reused.is_empty());
}

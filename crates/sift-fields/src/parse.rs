//! Selector syntax: parsing, escaping and unescaping.
//!
//! ```text
//! selector := term ("," term)* | ""
//! term     := field op value
//! op       := "=" | "==" | "!="
//! ```
//!
//! Inside values the characters `\`, `,` and `=` are written `\\`, `\,` and
//! `\=`. Terms are sorted before the selector is built, so `a=1,b=2` and
//! `b=2,a=1` parse to the same selector.

use std::str::FromStr;

use crate::error::{Result, SelectorError};
use crate::selection::Operator;
use crate::selector::Selector;

const NOT_EQUAL_OP: &str = "!=";
const DOUBLE_EQUAL_OP: &str = "==";
const EQUAL_OP: &str = "=";

/// Parses a field selector.
///
/// # Example
///
/// ```
/// use sift_fields::{parse_selector, Set};
///
/// let sel = parse_selector("tier!=free,status=active").unwrap();
/// assert_eq!(sel.to_string(), "status=active,tier!=free");
///
/// let rec = Set::from([("status", "active"), ("tier", "pro")]);
/// assert!(sel.matches(&rec));
/// ```
pub fn parse_selector(selector: &str) -> Result<Selector> {
    let mut items = parse_terms(selector)?;
    Ok(if items.len() == 1 {
        items.remove(0)
    } else {
        Selector::And(items)
    })
}

/// Parses a field selector and rewrites it with `f`.
///
/// Errors returned by `f` are wrapped in [`SelectorError::Transform`].
/// See [`Selector::transform`] for the rewrite rules.
pub fn parse_and_transform_selector<F, E>(selector: &str, f: F) -> Result<Selector>
where
    F: FnMut(&str, &str) -> std::result::Result<(String, String), E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    parse_selector(selector)?
        .transform(f)
        .map_err(SelectorError::transform)
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self> {
        parse_selector(s)
    }
}

fn parse_terms(selector: &str) -> Result<Vec<Selector>> {
    let mut parts = split_terms(selector);
    parts.sort_unstable();

    let mut items = Vec::with_capacity(parts.len());
    for part in parts {
        if part.is_empty() {
            continue;
        }
        let (lhs, op, rhs) = split_term(part).ok_or_else(|| SelectorError::MalformedTerm {
            selector: selector.to_string(),
            term: part.to_string(),
        })?;
        let value = unescape_value(rhs)?;
        let field = unescape_field(lhs);
        let item = match op {
            Operator::NotEquals => Selector::NotEqual { field, value },
            Operator::Equals | Operator::DoubleEquals => Selector::Equal { field, value },
            _ => {
                return Err(SelectorError::UnknownOperator {
                    selector: selector.to_string(),
                    term: part.to_string(),
                })
            }
        };
        items.push(item);
    }

    // `a==1` renders as `a=1`, so order by the rendered term to keep the
    // output canonical.
    items.sort_by_cached_key(|item| item.to_string());
    Ok(items)
}

/// Splits a selector on commas not preceded by a backslash.
///
/// Empty input yields no terms. Empty terms between commas are kept and
/// skipped by the parser.
pub(crate) fn split_terms(selector: &str) -> Vec<&str> {
    if selector.is_empty() {
        return Vec::new();
    }

    let mut terms = Vec::with_capacity(1);
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in selector.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ',' => {
                terms.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push(&selector[start..]);
    terms
}

/// Splits a term at its first operator into `(field, op, value)`.
///
/// `!=` is tried before `=`, and `=` followed by another `=` is `==`.
pub(crate) fn split_term(term: &str) -> Option<(&str, Operator, &str)> {
    for (i, _) in term.char_indices() {
        let rest = &term[i..];
        let (op, len) = if rest.starts_with(NOT_EQUAL_OP) {
            (Operator::NotEquals, NOT_EQUAL_OP.len())
        } else if rest.starts_with(DOUBLE_EQUAL_OP) {
            (Operator::DoubleEquals, DOUBLE_EQUAL_OP.len())
        } else if rest.starts_with(EQUAL_OP) {
            (Operator::Equals, EQUAL_OP.len())
        } else {
            continue;
        };
        return Some((&term[..i], op, &rest[len..]));
    }
    None
}

/// Escapes `\`, `,` and `=` in a value.
pub fn escape_value(value: &str) -> String {
    escape(value, |c| matches!(c, '\\' | ',' | '='))
}

/// Escapes `\` and `,` in a field name.
///
/// `=` is left alone: a field containing it cannot be parsed back, since the
/// first `=` of a term always starts the operator.
pub fn escape_field(field: &str) -> String {
    escape(field, |c| matches!(c, '\\' | ','))
}

fn escape(s: &str, reserved: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if reserved(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Reverses [`escape_value`].
///
/// # Errors
///
/// - [`SelectorError::InvalidEscapeSequence`] for a backslash followed by
///   anything but `\`, `,` or `=`, or a trailing backslash.
/// - [`SelectorError::UnescapedRune`] for a bare `,` or `=`.
pub fn unescape_value(value: &str) -> Result<String> {
    if !value.contains(&['\\', ',', '='][..]) {
        return Ok(value.to_string());
    }

    let mut out = String::with_capacity(value.len());
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            match c {
                '\\' | ',' | '=' => out.push(c),
                _ => return Err(SelectorError::InvalidEscapeSequence(format!("\\{c}"))),
            }
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ',' | '=' => return Err(SelectorError::UnescapedRune(c)),
            _ => out.push(c),
        }
    }

    if escaped {
        return Err(SelectorError::InvalidEscapeSequence("\\".to_string()));
    }
    Ok(out)
}

// Lenient: unknown escapes and a trailing backslash are kept as written.
fn unescape_field(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some(&next) if next == '\\' || next == ',' => {
                out.push(next);
                chars.next();
            }
            _ => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{and_term, everything, one_term_equal_selector};

    #[test]
    fn split_terms_basic() {
        assert!(split_terms("").is_empty());
        assert_eq!(split_terms("a=1"), vec!["a=1"]);
        assert_eq!(split_terms("a=1,b=2"), vec!["a=1", "b=2"]);
        assert_eq!(split_terms("a=1,,b=2"), vec!["a=1", "", "b=2"]);
        assert_eq!(split_terms("a=1,"), vec!["a=1", ""]);
    }

    #[test]
    fn split_terms_respects_escapes() {
        assert_eq!(split_terms(r"a=x\,y,b=2"), vec![r"a=x\,y", "b=2"]);
        assert_eq!(split_terms(r"a=x\\,b=2"), vec![r"a=x\\", "b=2"]);
        assert_eq!(split_terms(r"a\,b=1"), vec![r"a\,b=1"]);
    }

    #[test]
    fn split_terms_multibyte() {
        assert_eq!(split_terms("名=值,b=é"), vec!["名=值", "b=é"]);
        assert_eq!(split_terms("a=\\é,b=2"), vec!["a=\\é", "b=2"]);
    }

    #[test]
    fn split_term_operators() {
        assert_eq!(split_term("a=1"), Some(("a", Operator::Equals, "1")));
        assert_eq!(split_term("a==1"), Some(("a", Operator::DoubleEquals, "1")));
        assert_eq!(split_term("a!=1"), Some(("a", Operator::NotEquals, "1")));
        assert_eq!(split_term("a="), Some(("a", Operator::Equals, "")));
        assert_eq!(split_term("a=="), Some(("a", Operator::DoubleEquals, "")));
        assert_eq!(split_term("=1"), Some(("", Operator::Equals, "1")));
        assert_eq!(split_term("a!b=1"), Some(("a!b", Operator::Equals, "1")));
        assert_eq!(split_term("a=!=1"), Some(("a", Operator::Equals, "!=1")));
        assert_eq!(split_term("bogus"), None);
        assert_eq!(split_term("a!"), None);
    }

    #[test]
    fn escape_value_reserved() {
        assert_eq!(escape_value("plain"), "plain");
        assert_eq!(escape_value(r"a\b"), r"a\\b");
        assert_eq!(escape_value("a,b=c"), r"a\,b\=c");
        assert_eq!(escape_value(""), "");
    }

    #[test]
    fn escape_field_leaves_equals() {
        assert_eq!(escape_field("a,b"), r"a\,b");
        assert_eq!(escape_field(r"a\b"), r"a\\b");
        assert_eq!(escape_field("a=b"), "a=b");
    }

    #[test]
    fn unescape_value_ok() {
        assert_eq!(unescape_value("plain").unwrap(), "plain");
        assert_eq!(unescape_value(r"a\,b\=c\\d").unwrap(), r"a,b=c\d");
        assert_eq!(unescape_value("").unwrap(), "");
    }

    #[test]
    fn unescape_value_invalid_sequence() {
        match unescape_value(r"a\nb") {
            Err(SelectorError::InvalidEscapeSequence(seq)) => assert_eq!(seq, r"\n"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unescape_value_trailing_backslash() {
        match unescape_value(r"abc\") {
            Err(SelectorError::InvalidEscapeSequence(seq)) => assert_eq!(seq, r"\"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unescape_value_unescaped_rune() {
        assert!(matches!(
            unescape_value("a=b"),
            Err(SelectorError::UnescapedRune('='))
        ));
        assert!(matches!(
            unescape_value("a,b"),
            Err(SelectorError::UnescapedRune(','))
        ));
    }

    #[test]
    fn unescape_field_lenient() {
        assert_eq!(unescape_field("plain"), "plain");
        assert_eq!(unescape_field(r"a\,b"), "a,b");
        assert_eq!(unescape_field(r"a\\b"), r"a\b");
        assert_eq!(unescape_field(r"a\b"), r"a\b");
        assert_eq!(unescape_field(r"a\"), r"a\");
    }

    #[test]
    fn parse_empty_is_everything() {
        assert_eq!(parse_selector("").unwrap(), everything());
        assert_eq!(parse_selector(",").unwrap(), everything());
    }

    #[test]
    fn parse_single_term_is_bare() {
        assert_eq!(
            parse_selector("a=1").unwrap(),
            one_term_equal_selector("a", "1")
        );
    }

    #[test]
    fn parse_sorts_terms() {
        let sel = parse_selector("b=2,a=1").unwrap();
        assert_eq!(
            sel,
            and_term([
                one_term_equal_selector("a", "1"),
                one_term_equal_selector("b", "2"),
            ])
        );
    }

    #[test]
    fn parse_double_equals_orders_by_canonical_form() {
        let sel = parse_selector("a==0,a=1").unwrap();
        assert_eq!(sel.to_string(), "a=0,a=1");
        assert_eq!(parse_selector(&sel.to_string()).unwrap(), sel);
    }

    #[test]
    fn parse_keeps_whitespace() {
        let sel = parse_selector(" a = 1 ").unwrap();
        assert_eq!(sel, one_term_equal_selector(" a ", " 1 "));
    }

    #[test]
    fn parse_malformed_reports_sorted_first_bad_term() {
        let err = parse_selector("z=1,bogus,also").unwrap_err();
        assert_eq!(err.term(), Some("also"));
        assert_eq!(
            err.to_string(),
            "invalid selector: 'z=1,bogus,also'; can't split term: 'also'"
        );
    }

    #[test]
    fn parse_escape_errors_propagate() {
        assert!(matches!(
            parse_selector(r"a=\x"),
            Err(SelectorError::InvalidEscapeSequence(_))
        ));
        assert!(matches!(
            parse_selector("a=b=c"),
            Err(SelectorError::UnescapedRune('='))
        ));
        assert!(matches!(
            parse_selector(r"a=b\"),
            Err(SelectorError::InvalidEscapeSequence(_))
        ));
    }

    #[test]
    fn from_str_parses() {
        let sel: Selector = "a!=1".parse().unwrap();
        assert_eq!(sel.to_string(), "a!=1");
    }

    #[test]
    fn parse_and_transform_applies_function() {
        let sel = parse_and_transform_selector("name=web", |f, v| {
            Ok::<_, SelectorError>((format!("metadata.{f}"), v.to_string()))
        })
        .unwrap();
        assert_eq!(sel.to_string(), "metadata.name=web");
    }

    #[test]
    fn parse_and_transform_wraps_failure() {
        #[derive(Debug)]
        struct Unsupported(String);

        impl std::fmt::Display for Unsupported {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "field {} is not selectable", self.0)
            }
        }

        impl std::error::Error for Unsupported {}

        let err = parse_and_transform_selector("secret=1", |f, _| {
            Err::<(String, String), _>(Unsupported(f.to_string()))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "field secret is not selectable");
        match err {
            SelectorError::Transform(inner) => {
                assert_eq!(
                    inner.downcast_ref::<Unsupported>().map(|u| u.0.as_str()),
                    Some("secret")
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

//! Structured header grammar shared by the `text/occi` and `text/plain` codecs.
//!
//! A header value is a main value followed by `;`-separated `key=value`
//! parameters. Values may be quoted; inside quotes `\"` and `\\` escape.
//! Several values of one header are separated by `,`.

use crate::error::HeaderError;
use occi_core::AttributeValue;
use std::borrow::Cow;

/// Splits `input` at every `delimiter` outside double quotes.
///
/// Segments are trimmed; empty segments are dropped. Quotes and escapes are
/// kept so the segments can be split again.
///
/// # Errors
/// [`HeaderError::Invalid`] for an unterminated quoted string.
pub fn split_quoted(input: &str, delimiter: char) -> Result<Vec<&str>, HeaderError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (index, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if quoted && c == '\\' {
            escaped = true;
        } else if c == '"' {
            quoted = !quoted;
        } else if !quoted && c == delimiter {
            push_segment(&mut segments, &input[start..index]);
            start = index + c.len_utf8();
        }
    }
    if quoted {
        return Err(HeaderError::invalid(input, "unterminated quoted string"));
    }
    push_segment(&mut segments, &input[start..]);
    Ok(segments)
}

fn push_segment<'a>(segments: &mut Vec<&'a str>, segment: &'a str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        segments.push(segment);
    }
}

/// Removes surrounding quotes and resolves escapes. Bare tokens pass through.
///
/// # Errors
/// [`HeaderError::Invalid`] when only one side is quoted.
pub fn unquote(value: &str) -> Result<Cow<'_, str>, HeaderError> {
    let value = value.trim();
    match (value.starts_with('"'), value.len() > 1 && value.ends_with('"')) {
        (false, _) if value.ends_with('"') => Err(HeaderError::invalid(value, "unbalanced quotes")),
        (false, _) => Ok(Cow::Borrowed(value)),
        (true, false) => Err(HeaderError::invalid(value, "unbalanced quotes")),
        (true, true) => {
            let inner = &value[1..value.len() - 1];
            if !inner.contains('\\') {
                return Ok(Cow::Borrowed(inner));
            }
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    out.extend(chars.next());
                } else {
                    out.push(c);
                }
            }
            Ok(Cow::Owned(out))
        },
    }
}

/// Wraps `value` in quotes, escaping `\` and `"`.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// One `key=value` parameter of a structured header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub value: String,
    /// Whether the value was (or will be) written in quotes.
    pub quoted: bool,
}

/// `value; key="v"; key2=v2`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebHeader {
    pub value: String,
    pub params: Vec<Param>,
}

impl WebHeader {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), params: Vec::new() }
    }

    /// Appends a quoted parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Param { name: name.into(), value: value.into(), quoted: true });
        self
    }

    /// Appends a bare-token parameter.
    #[must_use]
    pub fn token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Param { name: name.into(), value: value.into(), quoted: false });
        self
    }

    /// # Errors
    /// [`HeaderError::Invalid`] for a missing main value, a parameter without
    /// `=`, or broken quoting.
    pub fn parse(header: &str, input: &str) -> Result<Self, HeaderError> {
        let mut segments = split_quoted(input, ';')?.into_iter();
        let value = segments.next().ok_or_else(|| HeaderError::invalid(header, "empty value"))?;

        let mut params = Vec::new();
        for segment in segments {
            let (name, raw) = segment
                .split_once('=')
                .ok_or_else(|| HeaderError::invalid(header, format!("\"{segment}\": expected key=value")))?;
            let raw = raw.trim();
            params.push(Param {
                name: name.trim().to_owned(),
                value: unquote(raw)?.into_owned(),
                quoted: raw.starts_with('"'),
            });
        }
        Ok(Self { value: value.to_owned(), params })
    }

    /// First parameter called `name`, compared case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name)).map(|p| p.value.as_str())
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.value.clone();
        for param in &self.params {
            out.push_str("; ");
            out.push_str(&param.name);
            out.push('=');
            if param.quoted {
                out.push_str(&quote(&param.value));
            } else {
                out.push_str(&param.value);
            }
        }
        out
    }
}

/// Parses one `name=value` attribute assignment.
///
/// Values are returned as strings, quoted or not; the attribute definition
/// decides the type on import.
///
/// # Errors
/// [`HeaderError::Invalid`] without `=` or with broken quoting.
pub fn parse_attribute(header: &str, input: &str) -> Result<(String, AttributeValue), HeaderError> {
    let (name, raw) = input
        .split_once('=')
        .ok_or_else(|| HeaderError::invalid(header, format!("\"{input}\": expected name=value")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(HeaderError::invalid(header, "empty attribute name"));
    }
    Ok((name.to_owned(), parse_value(raw)?))
}

/// Wire form of a parameter or attribute value: quoted or bare, it stays a
/// string until the attribute definition coerces it.
///
/// # Errors
/// [`HeaderError::Invalid`] with broken quoting.
pub fn parse_value(raw: &str) -> Result<AttributeValue, HeaderError> {
    let raw = raw.trim();
    if raw.starts_with('"') {
        return Ok(AttributeValue::String(unquote(raw)?.into_owned()));
    }
    Ok(AttributeValue::String(raw.to_owned()))
}

/// `name="text"` for strings, `name=value` for numbers and booleans.
#[must_use]
pub fn render_attribute(name: &str, value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s) => format!("{name}={}", quote(s)),
        other => format!("{name}={other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_outside_quotes() {
        let parts = split_quoted(r#"compute; title="a; b, c"; class=kind"#, ';').unwrap();
        assert_eq!(parts, vec!["compute", r#"title="a; b, c""#, "class=kind"]);

        let values = split_quoted(r#"a="x,y", b=2,, "#, ',').unwrap();
        assert_eq!(values, vec![r#"a="x,y""#, "b=2"]);
    }

    #[test]
    fn escaped_quotes_do_not_close_the_string() {
        let parts = split_quoted(r#"a="say \"hi\"; now"; b=1"#, ';').unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(unquote(r#""say \"hi\"; now""#).unwrap(), r#"say "hi"; now"#);
    }

    #[test]
    fn unterminated_quotes_are_rejected() {
        assert!(split_quoted(r#"a="open; b=1"#, ';').is_err());
        assert!(unquote(r#""open"#).is_err());
        assert!(unquote(r#"open""#).is_err());
    }

    #[test]
    fn quote_and_unquote_agree() {
        let text = r#"back\slash "and" quotes"#;
        assert_eq!(unquote(&quote(text)).unwrap(), text);
    }

    #[test]
    fn parses_structured_values() {
        let header = WebHeader::parse("Category", r#"compute; scheme="http://x#"; class=kind"#).unwrap();
        assert_eq!(header.value, "compute");
        assert_eq!(header.get("SCHEME"), Some("http://x#"));
        assert_eq!(header.get("class"), Some("kind"));
        assert_eq!(header.get("title"), None);

        let err = WebHeader::parse("Category", "compute; scheme").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn renders_quoted_and_bare_params() {
        let header = WebHeader::new("compute").param("scheme", "http://x#").token("class", "kind");
        assert_eq!(header.render(), r#"compute; scheme="http://x#"; class=kind"#);
        assert_eq!(WebHeader::parse("Category", &header.render()).unwrap(), header);
    }

    #[test]
    fn attribute_values_keep_their_wire_text() {
        assert_eq!(parse_attribute("A", "n=\"2\"").unwrap().1, AttributeValue::from("2"));
        assert_eq!(parse_attribute("A", "n=2").unwrap().1, AttributeValue::from("2"));
        assert_eq!(parse_attribute("A", "n=1.5").unwrap().1, AttributeValue::from("1.5"));
        assert_eq!(parse_attribute("A", "n=007").unwrap().1, AttributeValue::from("007"));
        assert_eq!(parse_attribute("A", "n=true").unwrap().1, AttributeValue::from("true"));
        assert_eq!(parse_attribute("A", "n=x86").unwrap().1, AttributeValue::from("x86"));
        assert!(parse_attribute("A", "novalue").is_err());
        assert!(parse_attribute("A", "=1").is_err());
    }

    #[test]
    fn renders_attributes_by_type() {
        assert_eq!(render_attribute("a", &AttributeValue::from("x\"y")), r#"a="x\"y""#);
        assert_eq!(render_attribute("a", &AttributeValue::Float(2.0)), "a=2.00");
        assert_eq!(render_attribute("a", &AttributeValue::Int(3)), "a=3");
        assert_eq!(render_attribute("a", &AttributeValue::Bool(false)), "a=n");
    }
}

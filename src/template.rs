//! A minimal text template language for alert messages.
//!
//! Templates are plain text with actions delimited by `{{` and `}}`:
//!
//! * `{{vendor}}`, `{{ vendor }}` and `{{.vendor}}` substitute a field value.
//!   Fields that were not extracted render as the empty string.
//! * `{{/* ... */}}` is a comment and renders nothing.
//! * A `-` directly inside a delimiter and separated from the action by
//!   whitespace (`{{- vendor -}}`) trims the surrounding text's whitespace.
//!
//! Output is never escaped. Parsing is the only step that can fail; rendering
//! a parsed template always succeeds and depends only on its inputs.

use crate::extract::FieldValues;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";

/// Errors produced while parsing a template. Offsets are byte positions of the
/// offending `{{` in the template source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed action starting at byte {offset}")]
    UnclosedAction { offset: usize },
    #[error("unclosed comment starting at byte {offset}")]
    UnclosedComment { offset: usize },
    #[error("empty action at byte {offset}")]
    EmptyAction { offset: usize },
    #[error("invalid field name '{name}' at byte {offset}")]
    InvalidName { offset: usize, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// What a single `{{ ... }}` action turned out to be.
struct Action {
    field: Option<String>,
    trim_left: bool,
    trim_right: bool,
    /// Byte offset just past the closing delimiter.
    end: usize,
}

impl Template {
    /// Parses `source` into a reusable template.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        let mut trim_next = false;

        while let Some(found) = source[cursor..].find(OPEN) {
            let open = cursor + found;
            let action = parse_action(source, open)?;

            let mut text = &source[cursor..open];
            if trim_next {
                text = text.trim_start();
            }
            if action.trim_left {
                text = text.trim_end();
            }
            push_text(&mut segments, text);

            if let Some(name) = action.field {
                segments.push(Segment::Field(name));
            }
            trim_next = action.trim_right;
            cursor = action.end;
        }

        let mut tail = &source[cursor..];
        if trim_next {
            tail = tail.trim_start();
        }
        push_text(&mut segments, tail);

        Ok(Self { segments })
    }

    /// Renders the template against `values`.
    pub fn render(&self, values: &FieldValues) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(name) => out.push_str(values.get(name)),
            }
        }
        out
    }

    /// Returns the field names referenced by the template, in order of
    /// appearance. Repeated references are reported once.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Field(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Parses `source` and renders it against `values` in one step.
pub fn render(source: &str, values: &FieldValues) -> Result<String, TemplateError> {
    Ok(Template::parse(source)?.render(values))
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(prev)) = segments.last_mut() {
        prev.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}

/// A trim marker is a `-` followed by whitespace.
fn has_left_trim_marker(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

fn parse_action(source: &str, open: usize) -> Result<Action, TemplateError> {
    let mut start = open + OPEN.len();
    let trim_left = has_left_trim_marker(&source[start..]);
    if trim_left {
        start += 1;
    }

    let body = &source[start..];
    let lead = body.len() - body.trim_start().len();
    if body[lead..].starts_with(COMMENT_OPEN) {
        return parse_comment(source, open, start + lead, trim_left);
    }

    let close = body
        .find(CLOSE)
        .ok_or(TemplateError::UnclosedAction { offset: open })?;
    let mut inner = &body[..close];
    let end = start + close + CLOSE.len();

    let trim_right = inner.ends_with('-')
        && inner[..inner.len() - 1]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
    if trim_right {
        inner = &inner[..inner.len() - 1];
    }

    let name = inner.trim();
    let name = name.strip_prefix('.').unwrap_or(name);
    if name.is_empty() {
        return Err(TemplateError::EmptyAction { offset: open });
    }
    if !is_valid_name(name) {
        return Err(TemplateError::InvalidName {
            offset: open,
            name: name.to_string(),
        });
    }

    Ok(Action {
        field: Some(name.to_string()),
        trim_left,
        trim_right,
        end,
    })
}

fn parse_comment(
    source: &str,
    open: usize,
    comment_start: usize,
    trim_left: bool,
) -> Result<Action, TemplateError> {
    let search_from = comment_start + COMMENT_OPEN.len();
    let close = source[search_from..]
        .find(COMMENT_CLOSE)
        .ok_or(TemplateError::UnclosedComment { offset: open })?;
    let after = search_from + close + COMMENT_CLOSE.len();
    let tail = &source[after..];

    if tail.starts_with(CLOSE) {
        return Ok(Action {
            field: None,
            trim_left,
            trim_right: false,
            end: after + CLOSE.len(),
        });
    }

    let ws = tail.len() - tail.trim_start().len();
    if ws > 0 && tail[ws..].starts_with("-}}") {
        return Ok(Action {
            field: None,
            trim_left,
            trim_right: true,
            end: after + ws + "-}}".len(),
        });
    }

    Err(TemplateError::UnclosedComment { offset: open })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_renders_usb_template() {
        let v = values(&[("vendor", "Acme"), ("model", "X1"), ("serial", "123")]);
        let out = render("Vendor: {{vendor}}\nModel: {{model}}\nSerial: {{serial}}", &v).unwrap();
        assert_eq!(out, "Vendor: Acme\nModel: X1\nSerial: 123");
    }

    #[test]
    fn test_spacing_and_leading_dot_are_accepted() {
        let v = values(&[("pid", "42")]);
        assert_eq!(render("{{ pid }}|{{.pid}}|{{ .pid }}", &v).unwrap(), "42|42|42");
    }

    #[test]
    fn test_missing_placeholder_renders_empty() {
        assert_eq!(render("{{missing}}", &FieldValues::new()).unwrap(), "");
        assert_eq!(
            render("a={{a}} b={{b}}", &values(&[("a", "1")])).unwrap(),
            "a=1 b="
        );
    }

    #[test]
    fn test_output_is_not_escaped() {
        let v = values(&[("cmdline", "<script> & \"x\"")]);
        assert_eq!(render("{{cmdline}}", &v).unwrap(), "<script> & \"x\"");
    }

    #[test]
    fn test_trim_markers() {
        let v = values(&[("a", "1"), ("b", "2")]);
        assert_eq!(render("x   {{- a -}}   y", &v).unwrap(), "x1y");
        assert_eq!(render("{{a}}\n\n{{- b}}", &v).unwrap(), "12");
        assert_eq!(render("{{a -}}\n  {{b}}", &v).unwrap(), "12");
    }

    #[test]
    fn test_hyphen_inside_name_is_not_a_trim_marker() {
        let v = values(&[("mac-addr", "aa:bb"), ("x-", "dash")]);
        assert_eq!(render("{{mac-addr}} {{x-}}", &v).unwrap(), "aa:bb dash");
    }

    #[test]
    fn test_comments_render_nothing() {
        let v = values(&[("a", "1")]);
        assert_eq!(render("{{/* note */}}{{a}}", &v).unwrap(), "1");
        assert_eq!(render("x {{- /* note */ -}} y", &v).unwrap(), "xy");
    }

    #[test]
    fn test_stray_closing_delimiter_is_literal() {
        assert_eq!(render("a }} b", &FieldValues::new()).unwrap(), "a }} b");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Template::parse("Vendor: {{vendor").unwrap_err(),
            TemplateError::UnclosedAction { offset: 8 }
        );
        assert_eq!(
            Template::parse("{{/* never closed }}").unwrap_err(),
            TemplateError::UnclosedComment { offset: 0 }
        );
        assert_eq!(
            Template::parse("x{{ }}").unwrap_err(),
            TemplateError::EmptyAction { offset: 1 }
        );
        assert_eq!(
            Template::parse("{{.}}").unwrap_err(),
            TemplateError::EmptyAction { offset: 0 }
        );
        assert!(matches!(
            Template::parse("{{vendor | upper}}").unwrap_err(),
            TemplateError::InvalidName { .. }
        ));
        assert!(matches!(
            Template::parse("{{9lives}}").unwrap_err(),
            TemplateError::InvalidName { .. }
        ));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let v = values(&[("gateway", "10.0.0.1"), ("mac", "aa:bb")]);
        let t = Template::parse("Gateway: {{gateway}}\nMAC Address: {{mac}}\n").unwrap();
        assert_eq!(t.render(&v), t.render(&v));
        assert_eq!(
            render("Gateway: {{gateway}}", &v).unwrap(),
            render("Gateway: {{gateway}}", &v).unwrap()
        );
    }

    #[test]
    fn test_placeholders_lists_unique_names_in_order() {
        let t = Template::parse("{{b}} {{a}} {{b}} {{/* c */}}").unwrap();
        assert_eq!(t.placeholders(), vec!["b", "a"]);
    }

    #[test]
    fn test_plain_text_and_empty_templates() {
        assert_eq!(render("", &FieldValues::new()).unwrap(), "");
        assert_eq!(render("just text", &FieldValues::new()).unwrap(), "just text");
    }
}

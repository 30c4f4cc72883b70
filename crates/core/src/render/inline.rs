//! Inline emphasis parsing over already-escaped text.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// A styled sub-run of text inside a block.
///
/// Text payloads are always escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InlineSpan {
    Text(String),
    Bold(Vec<InlineSpan>),
    Italic(String),
    LineBreak,
}

fn bold_re() -> &'static Regex {
    static BOLD_RE: OnceLock<Regex> = OnceLock::new();
    BOLD_RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("valid bold regex"))
}

fn italic_re() -> &'static Regex {
    static ITALIC_RE: OnceLock<Regex> = OnceLock::new();
    ITALIC_RE.get_or_init(|| {
        Regex::new(r"\*([^\s*](?:[^*]*?[^\s*])?)\*|\b_([^_]+?)_\b").expect("valid italic regex")
    })
}

/// Parse one escaped line into inline spans.
///
/// Bold delimiters are resolved first; italic parsing then runs on the text
/// between bold spans and inside them.
pub fn parse_inline(escaped: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in bold_re().captures_iter(escaped) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_italic(&escaped[last..whole.start()], &mut spans);
        let inner = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        let mut inner_spans = Vec::new();
        push_italic(inner, &mut inner_spans);
        spans.push(InlineSpan::Bold(inner_spans));
        last = whole.end();
    }
    push_italic(&escaped[last..], &mut spans);
    spans
}

fn push_italic(segment: &str, spans: &mut Vec<InlineSpan>) {
    let mut last = 0;
    for caps in italic_re().captures_iter(segment) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&segment[last..whole.start()], spans);
        let inner = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        spans.push(InlineSpan::Italic(inner.to_string()));
        last = whole.end();
    }
    push_text(&segment[last..], spans);
}

fn push_text(text: &str, spans: &mut Vec<InlineSpan>) {
    if text.is_empty() {
        return;
    }
    if let Some(InlineSpan::Text(prev)) = spans.last_mut() {
        prev.push_str(text);
    } else {
        spans.push(InlineSpan::Text(text.to_string()));
    }
}

/// Escaped text content of spans with all emphasis dropped.
pub fn spans_text(spans: &[InlineSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            InlineSpan::Text(t) | InlineSpan::Italic(t) => out.push_str(t),
            InlineSpan::Bold(inner) => out.push_str(&spans_text(inner)),
            InlineSpan::LineBreak => out.push('\n'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> InlineSpan {
        InlineSpan::Text(s.to_string())
    }

    #[test]
    fn test_bold_and_italic() {
        let spans = parse_inline("**bold** and *italic*");
        assert_eq!(
            spans,
            vec![
                InlineSpan::Bold(vec![text("bold")]),
                text(" and "),
                InlineSpan::Italic("italic".to_string()),
            ]
        );
    }

    #[test]
    fn test_underscore_variants() {
        let spans = parse_inline("__strong__ then _soft_");
        assert_eq!(
            spans,
            vec![
                InlineSpan::Bold(vec![text("strong")]),
                text(" then "),
                InlineSpan::Italic("soft".to_string()),
            ]
        );
    }

    #[test]
    fn test_bold_never_partially_italic() {
        let spans = parse_inline("**a**");
        assert_eq!(spans, vec![InlineSpan::Bold(vec![text("a")])]);
    }

    #[test]
    fn test_italic_inside_bold() {
        let spans = parse_inline("**Goal (from *you*):** fillet");
        assert_eq!(
            spans,
            vec![
                InlineSpan::Bold(vec![
                    text("Goal (from "),
                    InlineSpan::Italic("you".to_string()),
                    text("):"),
                ]),
                text(" fillet"),
            ]
        );
    }

    #[test]
    fn test_snake_case_untouched() {
        let spans = parse_inline("call root_component_name now");
        assert_eq!(spans, vec![text("call root_component_name now")]);
    }

    #[test]
    fn test_spaced_asterisks_are_not_italic() {
        let spans = parse_inline("2 * 3 * 4");
        assert_eq!(spans, vec![text("2 * 3 * 4")]);
    }

    #[test]
    fn test_unclosed_markers_stay_literal() {
        assert_eq!(parse_inline("**open"), vec![text("**open")]);
        assert_eq!(parse_inline("*open"), vec![text("*open")]);
    }

    #[test]
    fn test_spans_text_drops_emphasis() {
        let spans = parse_inline("**a** *b* c");
        assert_eq!(spans_text(&spans), "a b c");
    }
}

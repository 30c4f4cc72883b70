//! Line classification for the block renderer.
//!
//! Each matcher is a pure predicate + transform over a trimmed line. They are
//! tried in order and the first hit wins; anything unmatched is paragraph text.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Heading { level: u8, rest: &'a str },
    Step { rest: &'a str },
    Text(&'a str),
}

type LineMatcher = fn(&str) -> Option<LineKind<'_>>;

const MATCHERS: &[(&str, LineMatcher)] = &[
    ("blank", match_blank),
    ("heading", match_heading),
    ("step", match_step),
];

/// Longest marker first, so `## x` is never read as level 1.
const HEADING_MARKERS: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];

pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(trimmed))
        .unwrap_or(LineKind::Text(trimmed))
}

fn match_blank(line: &str) -> Option<LineKind<'_>> {
    line.is_empty().then_some(LineKind::Blank)
}

fn match_heading(line: &str) -> Option<LineKind<'_>> {
    HEADING_MARKERS.iter().find_map(|(marker, level)| {
        line.strip_prefix(marker).map(|rest| LineKind::Heading {
            level: *level,
            rest: rest.trim_start(),
        })
    })
}

fn step_re() -> &'static Regex {
    static STEP_RE: OnceLock<Regex> = OnceLock::new();
    STEP_RE.get_or_init(|| Regex::new(r"^\d+[.)]\s+(.*)$").expect("valid step regex"))
}

fn match_step(line: &str) -> Option<LineKind<'_>> {
    let caps = step_re().captures(line)?;
    let rest = caps.get(1)?.as_str();
    Some(LineKind::Step { rest })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_precedence() {
        assert_eq!(
            classify_line("### Deep"),
            LineKind::Heading { level: 3, rest: "Deep" }
        );
        assert_eq!(
            classify_line("## Mid"),
            LineKind::Heading { level: 2, rest: "Mid" }
        );
        assert_eq!(
            classify_line("# Top"),
            LineKind::Heading { level: 1, rest: "Top" }
        );
    }

    #[test]
    fn test_heading_needs_space() {
        assert_eq!(classify_line("#hashtag"), LineKind::Text("#hashtag"));
        assert_eq!(classify_line("####"), LineKind::Text("####"));
    }

    #[test]
    fn test_step_separators() {
        assert_eq!(classify_line("1. Sketch"), LineKind::Step { rest: "Sketch" });
        assert_eq!(classify_line("12) Extrude"), LineKind::Step { rest: "Extrude" });
        assert_eq!(classify_line("  3.   Fillet"), LineKind::Step { rest: "Fillet" });
    }

    #[test]
    fn test_not_steps() {
        assert_eq!(classify_line("1.5 mm wall"), LineKind::Text("1.5 mm wall"));
        assert_eq!(classify_line("v1. draft"), LineKind::Text("v1. draft"));
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line("  \t "), LineKind::Blank);
    }

    #[test]
    fn test_matcher_order_is_stable() {
        let names: Vec<&str> = MATCHERS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["blank", "heading", "step"]);
    }
}

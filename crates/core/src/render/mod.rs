//! Text Renderer - markdown subset to safe structured blocks.
//!
//! Supported subset:
//! - `#`, `##`, `###` headings
//! - numbered steps (`1.` / `1)`), rendered as checkbox items
//! - paragraphs, with single newlines kept as line breaks
//! - `**bold**` / `__bold__` and `*italic*` / `_italic_`
//!
//! All literal text is escaped before inline parsing, so the only markup that
//! can reach the output is the fixed set emitted by [`blocks_to_html`].

mod escape;
mod html;
mod inline;
mod lines;
mod step_id;

pub use escape::{escape_html, unescape_html};
pub use html::{blocks_to_html, blocks_to_plain, spans_to_html};
pub use inline::{InlineSpan, parse_inline, spans_text};
pub use lines::{LineKind, classify_line};
pub use step_id::{SequentialStepIds, SessionStepIds, StepId, StepIdGenerator};

use serde::Serialize;

/// One structural block of a rendered assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedBlock {
    Heading { level: u8, spans: Vec<InlineSpan> },
    Paragraph { spans: Vec<InlineSpan> },
    StepItem { id: StepId, spans: Vec<InlineSpan> },
}

impl RenderedBlock {
    pub fn spans(&self) -> &[InlineSpan] {
        match self {
            RenderedBlock::Heading { spans, .. }
            | RenderedBlock::Paragraph { spans }
            | RenderedBlock::StepItem { spans, .. } => spans,
        }
    }

    /// Same block with the step id blanked, for structural comparison.
    pub fn without_id(&self) -> RenderedBlock {
        match self {
            RenderedBlock::StepItem { spans, .. } => RenderedBlock::StepItem {
                id: StepId::new(""),
                spans: spans.clone(),
            },
            other => other.clone(),
        }
    }
}

enum State {
    None,
    InParagraph(Vec<InlineSpan>),
}

impl State {
    fn close(&mut self, blocks: &mut Vec<RenderedBlock>) {
        if let State::InParagraph(spans) = std::mem::replace(self, State::None) {
            blocks.push(RenderedBlock::Paragraph { spans });
        }
    }
}

/// Render raw assistant text into blocks.
///
/// Pure apart from the ids drawn from `ids`, one per step item.
pub fn render(text: &str, ids: &dyn StepIdGenerator) -> Vec<RenderedBlock> {
    let mut blocks = Vec::new();
    let mut state = State::None;

    for line in text.split('\n') {
        match classify_line(line) {
            LineKind::Blank => state.close(&mut blocks),
            LineKind::Heading { level, rest } => {
                state.close(&mut blocks);
                blocks.push(RenderedBlock::Heading {
                    level,
                    spans: parse_inline(&escape_html(rest)),
                });
            }
            LineKind::Step { rest } => {
                state.close(&mut blocks);
                blocks.push(RenderedBlock::StepItem {
                    id: ids.next(),
                    spans: parse_inline(&escape_html(rest)),
                });
            }
            LineKind::Text(content) => {
                let spans = parse_inline(&escape_html(content));
                match &mut state {
                    State::InParagraph(open) => {
                        open.push(InlineSpan::LineBreak);
                        open.extend(spans);
                    }
                    State::None => state = State::InParagraph(spans),
                }
            }
        }
    }
    state.close(&mut blocks);
    blocks
}

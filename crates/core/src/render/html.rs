use super::escape::{escape_html, unescape_html};
use super::inline::InlineSpan;
use super::RenderedBlock;

pub fn spans_to_html(spans: &[InlineSpan]) -> String {
    let mut out = String::new();
    write_spans_html(spans, &mut out);
    out
}

fn write_spans_html(spans: &[InlineSpan], out: &mut String) {
    for span in spans {
        match span {
            InlineSpan::Text(t) => out.push_str(t),
            InlineSpan::Bold(inner) => {
                out.push_str("<strong>");
                write_spans_html(inner, out);
                out.push_str("</strong>");
            }
            InlineSpan::Italic(t) => {
                out.push_str("<em>");
                out.push_str(t);
                out.push_str("</em>");
            }
            InlineSpan::LineBreak => out.push_str("<br>"),
        }
    }
}

/// Markup for the palette log.
pub fn blocks_to_html(blocks: &[RenderedBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            RenderedBlock::Heading { level, spans } => {
                out.push_str(&format!("<h{level}>"));
                write_spans_html(spans, &mut out);
                out.push_str(&format!("</h{level}>"));
            }
            RenderedBlock::Paragraph { spans } => {
                out.push_str("<p>");
                write_spans_html(spans, &mut out);
                out.push_str("</p>");
            }
            RenderedBlock::StepItem { id, spans } => {
                // ids land in attribute values
                let id = escape_html(id.as_str());
                out.push_str(&format!(
                    "<div class=\"step\"><input type=\"checkbox\" id=\"{id}\"><label for=\"{id}\">"
                ));
                write_spans_html(spans, &mut out);
                out.push_str("</label></div>");
            }
        }
    }
    out
}

fn spans_plain(spans: &[InlineSpan], out: &mut String) {
    for span in spans {
        match span {
            InlineSpan::Text(t) | InlineSpan::Italic(t) => out.push_str(&unescape_html(t)),
            InlineSpan::Bold(inner) => spans_plain(inner, out),
            InlineSpan::LineBreak => out.push('\n'),
        }
    }
}

/// Terminal rendering: headings keep their `#` marker, steps get `[ ]`.
pub fn blocks_to_plain(blocks: &[RenderedBlock]) -> String {
    let mut out = String::new();
    let mut prev_step = false;
    for (i, block) in blocks.iter().enumerate() {
        let is_step = matches!(block, RenderedBlock::StepItem { .. });
        if i > 0 {
            out.push_str(if is_step && prev_step { "\n" } else { "\n\n" });
        }
        match block {
            RenderedBlock::Heading { level, spans } => {
                out.push_str(&"#".repeat(*level as usize));
                out.push(' ');
                spans_plain(spans, &mut out);
            }
            RenderedBlock::Paragraph { spans } => spans_plain(spans, &mut out),
            RenderedBlock::StepItem { spans, .. } => {
                out.push_str("[ ] ");
                spans_plain(spans, &mut out);
            }
        }
        prev_step = is_step;
    }
    out
}

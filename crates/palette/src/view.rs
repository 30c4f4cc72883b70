//! Visible log entries and the status indicator.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use fusbuddy_core::render::{blocks_to_html, blocks_to_plain, escape_html};
use fusbuddy_core::{LlmProvider, RenderedBlock};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryKind {
    User,
    Assistant,
    Context,
}

impl LogEntryKind {
    fn css_class(&self) -> &'static str {
        match self {
            LogEntryKind::User => "user",
            LogEntryKind::Assistant => "assistant",
            LogEntryKind::Context => "context",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            LogEntryKind::User => "You",
            LogEntryKind::Assistant => "FusBuddy",
            LogEntryKind::Context => "Context",
        }
    }
}

/// A decoded-or-not viewport screenshot attached to a context update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenshotView {
    base64: String,
    decoded_len: Option<usize>,
}

impl ScreenshotView {
    pub fn from_base64(base64: &str) -> Self {
        let trimmed = base64.trim();
        let decoded_len = STANDARD.decode(trimmed).ok().map(|bytes| bytes.len());
        Self {
            base64: trimmed.to_string(),
            decoded_len,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.decoded_len.is_some()
    }

    pub fn decoded_len(&self) -> Option<usize> {
        self.decoded_len
    }

    fn size_label(&self) -> String {
        match self.decoded_len {
            Some(n) if n >= 1024 => format!("{:.1} KB", n as f64 / 1024.0),
            Some(n) => format!("{n} B"),
            None => "unreadable".to_string(),
        }
    }
}

/// What a context update displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextView {
    /// Parsed context: a summary line and/or a screenshot.
    Structured {
        summary: Option<String>,
        screenshot: Option<ScreenshotView>,
    },
    /// Valid JSON with nothing recognisable, shown pretty-printed.
    Json { pretty: String },
    /// Payload that failed to parse, shown verbatim.
    Raw { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LogBody {
    /// Literal text, no markdown interpretation.
    Text(String),
    Blocks(Vec<RenderedBlock>),
    Context(ContextView),
}

/// One item in the visible log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub kind: LogEntryKind,
    pub body: LogBody,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(kind: LogEntryKind, body: LogBody) -> Self {
        Self {
            kind,
            body,
            timestamp: Utc::now(),
        }
    }

    pub fn body_html(&self) -> String {
        match &self.body {
            LogBody::Text(text) => escape_html(text),
            LogBody::Blocks(blocks) => blocks_to_html(blocks),
            LogBody::Context(view) => context_html(view),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"message {}\"><div class=\"meta\">{} · {}</div><div class=\"content\">{}</div></div>",
            self.kind.css_class(),
            self.kind.label(),
            self.timestamp.format("%H:%M"),
            self.body_html()
        )
    }

    pub fn to_plain(&self) -> String {
        let body = match &self.body {
            LogBody::Text(text) => text.clone(),
            LogBody::Blocks(blocks) => blocks_to_plain(blocks),
            LogBody::Context(view) => context_plain(view),
        };
        format!("{}> {}", self.kind.label(), body)
    }
}

fn context_html(view: &ContextView) -> String {
    match view {
        ContextView::Structured {
            summary,
            screenshot,
        } => {
            let mut out = String::new();
            if let Some(summary) = summary {
                out.push_str(&format!("<p>{}</p>", escape_html(summary)));
            }
            match screenshot {
                Some(shot) if shot.is_valid() => out.push_str(&format!(
                    "<img class=\"screenshot\" alt=\"Viewport screenshot\" src=\"data:image/png;base64,{}\">",
                    escape_html(&shot.base64)
                )),
                Some(_) => out.push_str("<p>Screenshot attached but could not be decoded.</p>"),
                None => {}
            }
            out
        }
        ContextView::Json { pretty } => format!("<pre>{}</pre>", escape_html(pretty)),
        ContextView::Raw { text } => escape_html(text),
    }
}

fn context_plain(view: &ContextView) -> String {
    match view {
        ContextView::Structured {
            summary,
            screenshot,
        } => {
            let mut parts = Vec::new();
            if let Some(summary) = summary {
                parts.push(summary.clone());
            }
            if let Some(shot) = screenshot {
                parts.push(format!("[screenshot {}]", shot.size_label()));
            }
            parts.join(" ")
        }
        ContextView::Json { pretty } => pretty.clone(),
        ContextView::Raw { text } => text.clone(),
    }
}

/// Status indicator shown under the input box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum PaletteStatus {
    Ready,
    Sending,
    SavingApiKey,
    ApiKeySaved(LlmProvider),
    /// Input validation failure, handled locally.
    Rejected(String),
    Error(String),
}

impl PaletteStatus {
    pub fn label(&self) -> String {
        match self {
            PaletteStatus::Ready => "Ready".to_string(),
            PaletteStatus::Sending => "Sending...".to_string(),
            PaletteStatus::SavingApiKey => "Saving API key...".to_string(),
            PaletteStatus::ApiKeySaved(provider) => format!("API key saved ({provider})"),
            PaletteStatus::Rejected(reason) => reason.clone(),
            PaletteStatus::Error(reason) => format!("Error: {reason}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PaletteStatus::Error(_))
    }
}

/// Changes observers are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteUpdate {
    EntryAppended(LogEntry),
    StatusChanged(PaletteStatus),
    SendEnabled(bool),
    SaveEnabled(bool),
}

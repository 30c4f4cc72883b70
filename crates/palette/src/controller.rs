//! Chat Transcript Controller.
//!
//! Owns the transcript, the visible log, the status indicator and the
//! send / save affordances. All mutation goes through `&mut self` on the
//! palette's event loop; the only suspension points are bridge round trips.

use std::sync::Arc;

use fusbuddy_core::redaction::sanitize_text;
use fusbuddy_core::render::{StepIdGenerator, render};
use fusbuddy_core::{DesignContext, LlmProvider, Message, Transcript};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bridge::{AssistantMessagePayload, BridgeError, DynBridge, InboundAction, OutboundAction};
use crate::view::{
    ContextView, LogBody, LogEntry, LogEntryKind, PaletteStatus, PaletteUpdate, ScreenshotView,
};

pub const ACK_OK: &str = "OK";

/// Result of a submit or save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input; nothing happened.
    Ignored,
    /// Input failed validation; status explains why.
    Rejected,
    /// The bridge accepted the request.
    Sent,
    /// The bridge call failed; status carries the error.
    Failed,
}

pub struct ChatController {
    bridge: DynBridge,
    step_ids: Arc<dyn StepIdGenerator>,
    transcript: Transcript,
    log: Vec<LogEntry>,
    status: PaletteStatus,
    input: String,
    send_enabled: bool,
    save_enabled: bool,
    listeners: Vec<mpsc::UnboundedSender<PaletteUpdate>>,
}

impl ChatController {
    pub fn new(bridge: DynBridge, step_ids: Arc<dyn StepIdGenerator>) -> Self {
        Self {
            bridge,
            step_ids,
            transcript: Transcript::new(),
            log: Vec::new(),
            status: PaletteStatus::Ready,
            input: String::new(),
            send_enabled: true,
            save_enabled: true,
            listeners: Vec::new(),
        }
    }

    // --- Observers ---

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn status(&self) -> &PaletteStatus {
        &self.status
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn save_enabled(&self) -> bool {
        self.save_enabled
    }

    /// Receive every subsequent [`PaletteUpdate`].
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PaletteUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    fn notify(&mut self, update: PaletteUpdate) {
        self.listeners.retain(|tx| tx.send(update.clone()).is_ok());
    }

    fn set_status(&mut self, status: PaletteStatus) {
        debug!("Palette status: {}", status.label());
        self.status = status.clone();
        self.notify(PaletteUpdate::StatusChanged(status));
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
        self.notify(PaletteUpdate::SendEnabled(enabled));
    }

    fn set_save_enabled(&mut self, enabled: bool) {
        self.save_enabled = enabled;
        self.notify(PaletteUpdate::SaveEnabled(enabled));
    }

    fn append_entry(&mut self, entry: LogEntry) {
        self.log.push(entry.clone());
        self.notify(PaletteUpdate::EntryAppended(entry));
    }

    async fn call_bridge(
        &self,
        action: OutboundAction,
        payload: Value,
    ) -> Result<String, BridgeError> {
        debug!(
            "Bridge send {}: {}",
            action,
            sanitize_text(&payload.to_string())
        );
        self.bridge.send(action, payload).await
    }

    // --- Operations ---

    /// Append the user's text and forward it to the host.
    pub async fn submit_user_text(&mut self, text: &str) -> SubmitOutcome {
        // `&mut self` is held across the bridge call, so sends never overlap.
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let message = Message::user(text);
        let entry = LogEntry {
            kind: LogEntryKind::User,
            body: LogBody::Text(text.to_string()),
            timestamp: message.timestamp(),
        };
        self.transcript.push(message);
        self.append_entry(entry);
        self.input.clear();

        self.set_send_enabled(false);
        self.set_status(PaletteStatus::Sending);

        let payload = serde_json::json!({ "text": text });
        let result = self.call_bridge(OutboundAction::UserQuery, payload).await;
        self.set_send_enabled(true);

        match result {
            Ok(ack) => {
                debug!("userQuery acknowledged: {}", ack);
                self.set_status(PaletteStatus::Ready);
                SubmitOutcome::Sent
            }
            Err(e) => {
                warn!("userQuery failed: {}", e);
                self.input = text.to_string();
                self.set_status(PaletteStatus::Error(
                    "could not reach the assistant, please try again".to_string(),
                ));
                SubmitOutcome::Failed
            }
        }
    }

    /// Append an assistant reply, rendered through the block renderer.
    pub fn receive_assistant_text(&mut self, text: &str) {
        let message = Message::assistant(text);
        let blocks = render(message.text(), self.step_ids.as_ref());
        let entry = LogEntry {
            kind: LogEntryKind::Assistant,
            body: LogBody::Blocks(blocks),
            timestamp: message.timestamp(),
        };
        self.transcript.push(message);
        self.append_entry(entry);
        self.set_status(PaletteStatus::Ready);
    }

    /// Show a context push. Never fails: unparseable payloads are shown raw.
    pub fn receive_context_update(&mut self, json_text: &str) {
        let view = match serde_json::from_str::<Value>(json_text) {
            Ok(value) => context_view(&value),
            Err(e) => {
                debug!("contextUpdate is not JSON ({}), showing raw text", e);
                ContextView::Raw {
                    text: json_text.to_string(),
                }
            }
        };
        self.append_entry(LogEntry::new(
            LogEntryKind::Context,
            LogBody::Context(view),
        ));
    }

    /// Ask the host to store an API key for `provider`.
    pub async fn save_api_key(&mut self, api_key: &str, provider: LlmProvider) -> SubmitOutcome {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            self.set_status(PaletteStatus::Rejected(
                "Please enter an API key".to_string(),
            ));
            return SubmitOutcome::Rejected;
        }

        self.set_save_enabled(false);
        self.set_status(PaletteStatus::SavingApiKey);

        let payload = serde_json::json!({ "apiKey": api_key, "provider": provider });
        let result = self.call_bridge(OutboundAction::SaveApiKey, payload).await;
        self.set_save_enabled(true);

        match result {
            Ok(_) => {
                info!("Saved {} API key", provider);
                self.set_status(PaletteStatus::ApiKeySaved(provider));
                SubmitOutcome::Sent
            }
            Err(e) => {
                warn!("saveApiKey failed: {}", e);
                self.set_status(PaletteStatus::Error("could not save the API key".to_string()));
                SubmitOutcome::Failed
            }
        }
    }

    /// Dispatch a host push and return its acknowledgement.
    pub fn handle_inbound(&mut self, action: &str, data: &str) -> String {
        match InboundAction::parse(action) {
            InboundAction::AssistantMessage => {
                let text = match serde_json::from_str::<AssistantMessagePayload>(data) {
                    Ok(payload) => payload.text,
                    Err(e) => {
                        debug!("assistantMessage payload not JSON ({}), using raw text", e);
                        data.to_string()
                    }
                };
                self.receive_assistant_text(&text);
                ACK_OK.to_string()
            }
            InboundAction::ContextUpdate => {
                self.receive_context_update(data);
                ACK_OK.to_string()
            }
            InboundAction::Debugger => {
                debug!("Debugger requested by host (data: {} bytes)", data.len());
                ACK_OK.to_string()
            }
            InboundAction::Unknown(other) => {
                warn!("Unexpected inbound action: {}", other);
                format!("Unexpected command type: {other}")
            }
        }
    }
}

fn context_view(value: &Value) -> ContextView {
    let ctx = DesignContext::from_value(value);
    if ctx.is_empty() {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        return ContextView::Json { pretty };
    }
    ContextView::Structured {
        summary: ctx.summary_line(),
        screenshot: ctx.screenshot_base64().map(ScreenshotView::from_base64),
    }
}

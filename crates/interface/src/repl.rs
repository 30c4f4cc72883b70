//! Terminal palette
//!
//! Drives a `PaletteSession` over the loopback host. Lines typed on stdin are
//! submitted as user queries; a printer task renders every log entry and
//! status change the controller publishes.
//!
//! Commands:
//! - `/key <openai|gemini> <KEY>` - store an API key
//! - `/quit` - leave the session

use std::path::PathBuf;
use std::sync::Arc;

use fusbuddy_core::render::SessionStepIds;
use fusbuddy_core::{DesignContext, LlmProvider};
use fusbuddy_palette::{LoopbackBridge, PaletteSession, PaletteStatus, PaletteUpdate, UiEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Event(UiEvent),
    Quit,
    Help,
    Invalid(String),
}

pub fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ReplInput::Event(UiEvent::Submit(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("exit") | Some("q") => ReplInput::Quit,
        Some("help") | Some("h") => ReplInput::Help,
        Some("key") => {
            let provider = parts.next().map(str::parse::<LlmProvider>);
            let key = parts.next().unwrap_or_default();
            match provider {
                Some(Ok(provider)) => ReplInput::Event(UiEvent::SaveApiKey {
                    api_key: key.to_string(),
                    provider,
                }),
                Some(Err(e)) => ReplInput::Invalid(e.to_string()),
                None => ReplInput::Invalid("usage: /key <openai|gemini> <KEY>".to_string()),
            }
        }
        Some(other) => ReplInput::Invalid(format!("unknown command: /{other}")),
        None => ReplInput::Invalid("empty command".to_string()),
    }
}

const HELP: &str = "Type a question and press Enter.\n  /key <openai|gemini> <KEY>  store an API key\n  /quit                       leave";

pub(crate) fn format_update(update: &PaletteUpdate, html: bool) -> Option<String> {
    match update {
        PaletteUpdate::EntryAppended(entry) if html => Some(entry.to_html()),
        PaletteUpdate::EntryAppended(entry) => Some(entry.to_plain()),
        PaletteUpdate::StatusChanged(
            status @ (PaletteStatus::Error(_)
            | PaletteStatus::Rejected(_)
            | PaletteStatus::ApiKeySaved(_)),
        ) => Some(format!("[{}]", status.label())),
        PaletteUpdate::StatusChanged(status) => {
            debug!("status: {}", status.label());
            None
        }
        PaletteUpdate::SendEnabled(_) | PaletteUpdate::SaveEnabled(_) => None,
    }
}

pub async fn run_chat(
    config_path: PathBuf,
    context: Option<DesignContext>,
    html: bool,
) -> anyhow::Result<()> {
    let mut bridge = LoopbackBridge::new(config_path);
    if let Some(context) = context {
        bridge = bridge.with_context(context);
    }

    let mut session = PaletteSession::new(Arc::new(bridge), Arc::new(SessionStepIds::new()));
    let mut updates = session.controller_mut().subscribe();

    let printer = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            if let Some(line) = format_update(&update, html) {
                println!("{line}\n");
            }
        }
    });

    let (ui_tx, ui_rx) = mpsc::channel(16);
    let session_task = tokio::spawn(session.run(ui_rx));

    println!("FusBuddy360 - {HELP}\n");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            ReplInput::Event(event) => {
                if ui_tx.send(event).await.is_err() {
                    break;
                }
            }
            ReplInput::Quit => break,
            ReplInput::Help => println!("{HELP}\n"),
            ReplInput::Invalid(reason) => println!("[{reason}]\n"),
        }
    }
    drop(ui_tx);

    // Dropping the controller closes the update channel and stops the printer.
    let controller = session_task.await?;
    let messages = controller.transcript().len();
    drop(controller);
    printer.await?;
    info!("Chat session ended after {} messages", messages);
    Ok(())
}

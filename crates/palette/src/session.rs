//! Palette session - the single-threaded event loop around a controller.

use std::sync::Arc;

use fusbuddy_core::LlmProvider;
use fusbuddy_core::render::StepIdGenerator;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::bridge::{DynBridge, InboundMessage, InboundReceiver};
use crate::controller::ChatController;

/// Input from the palette UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Submit(String),
    SaveApiKey {
        api_key: String,
        provider: LlmProvider,
    },
}

pub struct PaletteSession {
    controller: ChatController,
    inbound: InboundReceiver,
}

impl PaletteSession {
    /// Create a controller and register its inbound channel with `bridge`.
    pub fn new(bridge: DynBridge, step_ids: Arc<dyn StepIdGenerator>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        bridge.register_handler(tx);
        Self {
            controller: ChatController::new(bridge, step_ids),
            inbound: rx,
        }
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ChatController {
        &mut self.controller
    }

    fn dispatch(&mut self, msg: InboundMessage) {
        let ack = self.controller.handle_inbound(&msg.action, &msg.data);
        if let Some(tx) = msg.ack {
            let _ = tx.send(ack);
        }
    }

    async fn handle_ui(&mut self, event: UiEvent) {
        match event {
            UiEvent::Submit(text) => {
                self.controller.submit_user_text(&text).await;
            }
            UiEvent::SaveApiKey { api_key, provider } => {
                self.controller.save_api_key(&api_key, provider).await;
            }
        }
    }

    /// Run until the UI channel closes, then drain queued host pushes and
    /// hand the controller back.
    ///
    /// Host pushes are polled first so a reply queued during a send is shown
    /// before the next UI event is handled.
    pub async fn run(mut self, mut ui: mpsc::Receiver<UiEvent>) -> ChatController {
        info!("Palette session started");
        loop {
            tokio::select! {
                biased;
                Some(msg) = self.inbound.recv() => self.dispatch(msg),
                event = ui.recv() => match event {
                    Some(event) => self.handle_ui(event).await,
                    None => break,
                },
            }
        }
        while let Ok(msg) = self.inbound.try_recv() {
            self.dispatch(msg);
        }
        debug!(
            "Palette session closed with {} messages",
            self.controller.transcript().len()
        );
        self.controller
    }
}

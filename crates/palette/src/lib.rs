//! FusBuddy360 Palette - chat controller and host bridge
//!
//! Responsibilities:
//! - Bridge: outbound `send` / inbound push registration
//! - ChatController: transcript, visible log, status, affordances
//! - PaletteSession: single-threaded event loop
//! - LoopbackBridge: in-process host for the terminal front-end

pub mod bridge;
pub mod controller;
pub mod loopback;
pub mod session;
pub mod view;


pub use bridge::{
    Bridge, BridgeError, DynBridge, InboundAction, InboundMessage, InboundSender, OutboundAction,
};
pub use controller::{ACK_OK, ChatController, SubmitOutcome};
pub use loopback::LoopbackBridge;
pub use session::{PaletteSession, UiEvent};
pub use view::{ContextView, LogBody, LogEntry, LogEntryKind, PaletteStatus, PaletteUpdate};

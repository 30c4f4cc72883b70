//! Bridge trait - the two-way channel between the palette and its host.
//!
//! The host side (CAD scripting runtime, model calls) is opaque to the
//! palette. Outbound requests go through [`Bridge::send`]; the host pushes
//! inbound messages through the channel installed with
//! [`Bridge::register_handler`] and gets an acknowledgement string back.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use fusbuddy_core::LlmProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Requests the palette sends to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundAction {
    UserQuery,
    SaveApiKey,
}

impl OutboundAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboundAction::UserQuery => "userQuery",
            OutboundAction::SaveApiKey => "saveApiKey",
        }
    }
}

impl fmt::Display for OutboundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pushes the host sends to the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundAction {
    AssistantMessage,
    ContextUpdate,
    Debugger,
    Unknown(String),
}

impl InboundAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "assistantMessage" => Self::AssistantMessage,
            "contextUpdate" => Self::ContextUpdate,
            "debugger" => Self::Debugger,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AssistantMessage => "assistantMessage",
            Self::ContextUpdate => "contextUpdate",
            Self::Debugger => "debugger",
            Self::Unknown(other) => other,
        }
    }
}

/// `userQuery` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQueryPayload {
    pub text: String,
}

/// `saveApiKey` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveApiKeyPayload {
    pub api_key: String,
    pub provider: LlmProvider,
}

/// `assistantMessage` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessagePayload {
    pub text: String,
}

/// A push from the host. `ack` receives the handler's acknowledgement.
#[derive(Debug)]
pub struct InboundMessage {
    pub action: String,
    pub data: String,
    pub ack: Option<oneshot::Sender<String>>,
}

impl InboundMessage {
    pub fn new(action: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            data: data.into(),
            ack: None,
        }
    }

    /// Same message plus a receiver for the acknowledgement.
    pub fn with_ack(
        action: impl Into<String>,
        data: impl Into<String>,
    ) -> (Self, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        let msg = Self {
            action: action.into(),
            data: data.into(),
            ack: Some(tx),
        };
        (msg, rx)
    }
}

pub type InboundSender = mpsc::UnboundedSender<InboundMessage>;
pub type InboundReceiver = mpsc::UnboundedReceiver<InboundMessage>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("bridge is not connected")]
    NotConnected,

    #[error("host rejected {action}: {reason}")]
    Rejected { action: String, reason: String },

    #[error("invalid payload for {action}: {reason}")]
    InvalidPayload { action: String, reason: String },

    #[error("host error: {0}")]
    Host(String),
}

/// The host-provided message channel.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Send a request to the host and wait for it to settle.
    async fn send(&self, action: OutboundAction, payload: Value) -> Result<String, BridgeError>;

    /// Install the channel the host pushes inbound messages through.
    fn register_handler(&self, handler: InboundSender);
}

pub type DynBridge = Arc<dyn Bridge>;

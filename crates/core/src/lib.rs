//! FusBuddy360 Core - palette data model and text rendering
//!
//! Contains:
//! - Message / Transcript: the append-only chat log
//! - render: markdown subset -> escaped blocks -> HTML or plain text
//! - config: per-user API keys and provider preference
//! - context: design context snapshots pushed by the host
//! - coach: offline structured reply
//! - redaction: key masking for logs

pub mod coach;
pub mod config;
pub mod context;
mod message;
pub mod redaction;
pub mod render;

pub use config::{
    ConfigError, KeySource, LlmProvider, ProviderPreference, ResolvedKey, UserConfig,
    detect_provider, detect_provider_with,
};
pub use context::DesignContext;
pub use message::*;
pub use render::{RenderedBlock, StepId, StepIdGenerator, render};

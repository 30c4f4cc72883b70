//! In-process bridge used by the terminal front-end.
//!
//! Plays the host's part without a CAD runtime or network access: queries are
//! answered with the offline structured coach reply and API keys are written
//! to the user config file.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use fusbuddy_core::coach::structured_reply;
use fusbuddy_core::{DesignContext, UserConfig, detect_provider};
use serde_json::Value;
use tracing::{debug, info};

use crate::bridge::{
    AssistantMessagePayload, Bridge, BridgeError, InboundMessage, InboundSender, OutboundAction,
    SaveApiKeyPayload, UserQueryPayload,
};
use crate::controller::ACK_OK;

pub struct LoopbackBridge {
    config_path: PathBuf,
    context: Option<DesignContext>,
    handler: Mutex<Option<InboundSender>>,
}

impl LoopbackBridge {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            context: None,
            handler: Mutex::new(None),
        }
    }

    /// Push `context` as a `contextUpdate` before every reply.
    pub fn with_context(mut self, context: DesignContext) -> Self {
        self.context = Some(context);
        self
    }

    fn push(&self, action: &str, data: String) -> Result<(), BridgeError> {
        let guard = self
            .handler
            .lock()
            .map_err(|_| BridgeError::Host("handler lock poisoned".to_string()))?;
        let handler = guard.as_ref().ok_or(BridgeError::NotConnected)?;
        handler
            .send(InboundMessage::new(action, data))
            .map_err(|_| BridgeError::NotConnected)
    }

    fn is_connected(&self) -> bool {
        self.handler
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|tx| !tx.is_closed()))
            .unwrap_or(false)
    }

    fn answer_query(&self, payload: Value) -> Result<String, BridgeError> {
        let query: UserQueryPayload =
            serde_json::from_value(payload).map_err(|e| BridgeError::InvalidPayload {
                action: OutboundAction::UserQuery.to_string(),
                reason: e.to_string(),
            })?;

        let config = UserConfig::load(&self.config_path);
        match detect_provider(&config) {
            Some(resolved) => info!(
                "Using {} API key {} (offline reply)",
                resolved.provider,
                resolved.preview()
            ),
            None => debug!("No API key configured, answering offline"),
        }

        let context = self.context.clone().unwrap_or_default();
        if self.context.is_some() {
            let data = serde_json::to_string(&context)
                .map_err(|e| BridgeError::Host(e.to_string()))?;
            self.push("contextUpdate", data)?;
        }

        let reply = AssistantMessagePayload {
            text: structured_reply(&query.text, &context),
        };
        let data = serde_json::to_string(&reply).map_err(|e| BridgeError::Host(e.to_string()))?;
        self.push("assistantMessage", data)?;
        Ok(ACK_OK.to_string())
    }

    fn save_key(&self, payload: Value) -> Result<String, BridgeError> {
        let request: SaveApiKeyPayload =
            serde_json::from_value(payload).map_err(|e| BridgeError::InvalidPayload {
                action: OutboundAction::SaveApiKey.to_string(),
                reason: e.to_string(),
            })?;
        if request.api_key.trim().is_empty() {
            return Err(BridgeError::Rejected {
                action: OutboundAction::SaveApiKey.to_string(),
                reason: "empty API key".to_string(),
            });
        }

        let mut config = UserConfig::load(&self.config_path);
        config.set_api_key(request.provider, &request.api_key);
        config
            .save(&self.config_path)
            .map_err(|e| BridgeError::Host(e.to_string()))?;
        Ok(ACK_OK.to_string())
    }
}

#[async_trait]
impl Bridge for LoopbackBridge {
    async fn send(&self, action: OutboundAction, payload: Value) -> Result<String, BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::NotConnected);
        }
        match action {
            OutboundAction::UserQuery => self.answer_query(payload),
            OutboundAction::SaveApiKey => self.save_key(payload),
        }
    }

    fn register_handler(&self, handler: InboundSender) {
        if let Ok(mut guard) = self.handler.lock() {
            *guard = Some(handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusbuddy_core::LlmProvider;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_send_before_register_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = LoopbackBridge::new(dir.path().join("config.json"));
        let err = bridge
            .send(OutboundAction::UserQuery, json!({"text": "hi"}))
            .await
            .unwrap_err();
        assert_eq!(err, BridgeError::NotConnected);
    }

    #[tokio::test]
    async fn test_user_query_pushes_reply() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = LoopbackBridge::new(dir.path().join("config.json"));
        let (tx, mut rx) = mpsc::unbounded_channel();
        bridge.register_handler(tx);

        let ack = bridge
            .send(OutboundAction::UserQuery, json!({"text": "How do I fillet?"}))
            .await
            .unwrap();
        assert_eq!(ack, "OK");

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.action, "assistantMessage");
        let payload: AssistantMessagePayload = serde_json::from_str(&msg.data).unwrap();
        assert!(payload.text.contains("How do I fillet?"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_context_pushed_before_reply() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = DesignContext::from_value(&json!({"document": {"name": "Hinge"}}));
        let bridge = LoopbackBridge::new(dir.path().join("config.json")).with_context(ctx);
        let (tx, mut rx) = mpsc::unbounded_channel();
        bridge.register_handler(tx);

        bridge
            .send(OutboundAction::UserQuery, json!({"text": "q"}))
            .await
            .unwrap();
        assert_eq!(rx.try_recv().unwrap().action, "contextUpdate");
        let reply = rx.try_recv().unwrap();
        assert_eq!(reply.action, "assistantMessage");
        assert!(reply.data.contains("Hinge"));
    }

    #[tokio::test]
    async fn test_save_api_key_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let bridge = LoopbackBridge::new(path.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        bridge.register_handler(tx);

        bridge
            .send(
                OutboundAction::SaveApiKey,
                json!({"apiKey": " AIzaKey123 ", "provider": "gemini"}),
            )
            .await
            .unwrap();
        let cfg = UserConfig::load(&path);
        assert_eq!(cfg.api_key(LlmProvider::Gemini), Some("AIzaKey123"));
    }

    #[tokio::test]
    async fn test_save_api_key_rejects_bad_provider() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = LoopbackBridge::new(dir.path().join("config.json"));
        let (tx, _rx) = mpsc::unbounded_channel();
        bridge.register_handler(tx);

        let err = bridge
            .send(
                OutboundAction::SaveApiKey,
                json!({"apiKey": "k", "provider": "claude"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidPayload { .. }));
    }
}

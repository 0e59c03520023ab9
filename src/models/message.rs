//! Chat message model.

use serde::{Deserialize, Serialize};

/// Message document stored in `chats/{chatId}/messages/{messageId}`.
/// Immutable once created; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Legacy field name for `content` on old documents.
    #[serde(default)]
    pub texto: Option<String>,
}

impl Message {
    /// Message body, falling back to the legacy `texto` field.
    pub fn text(&self) -> &str {
        self.content
            .as_deref()
            .or(self.texto.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_prefers_content_over_legacy_texto() {
        let msg: Message =
            serde_json::from_value(json!({"content": "hola", "texto": "vieja"})).unwrap();
        assert_eq!(msg.text(), "hola");

        let msg: Message = serde_json::from_value(json!({"texto": "vieja"})).unwrap();
        assert_eq!(msg.text(), "vieja");

        let msg: Message = serde_json::from_value(json!({})).unwrap();
        assert_eq!(msg.text(), "");
    }
}

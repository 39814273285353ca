use serde::{Deserialize, Serialize};

/// One message of a conversation, as returned by `get-chat`.
///
/// Messages are held for a single render pass; the client never accumulates
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Username of the author.
    #[serde(rename = "sendername")]
    pub sender: String,

    /// Message body.
    #[serde(rename = "message")]
    pub text: String,

    /// Username of the addressee, when the backend includes it.
    #[serde(rename = "gettername", default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl ChatMessage {
    /// Create a new message from `sender` with body `text`.
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            recipient: None,
        }
    }

    /// Set the addressee.
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// True when `user` wrote this message.
    pub fn is_from(&self, user: &str) -> bool {
        self.sender == user
    }
}

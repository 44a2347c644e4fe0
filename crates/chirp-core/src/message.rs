// ABOUTME: Chat message model and conversation serialization.
// ABOUTME: Messages are stored as a JSON array keyed by id, role, content, createdAt.

use crate::error::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content of the bot message appended when a simulated generation fails
pub const FAILURE_NOTICE: &str = "Generation failed. Tap Retry.";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID
    pub id: String,
    pub role: Role,
    /// Grows while the message is streaming
    pub content: String,
    /// Epoch milliseconds
    pub created_at: i64,
    /// True while content is being revealed
    #[serde(default, skip_serializing_if = "is_false")]
    pub streaming: bool,
    /// True when generation failed and the message awaits retry
    #[serde(default, skip_serializing_if = "is_false")]
    pub failed: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Message {
    /// A complete user message
    pub fn user(content: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: new_id(),
            role: Role::User,
            content: content.into(),
            created_at,
            streaming: false,
            failed: false,
        }
    }

    /// An empty bot message about to be revealed
    pub fn bot_streaming(created_at: i64) -> Self {
        Self {
            id: new_id(),
            role: Role::Bot,
            content: String::new(),
            created_at,
            streaming: true,
            failed: false,
        }
    }

    /// A bot message standing in for a failed generation
    pub fn bot_failed(created_at: i64) -> Self {
        Self {
            id: new_id(),
            role: Role::Bot,
            content: FAILURE_NOTICE.to_string(),
            created_at,
            streaming: false,
            failed: true,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Format the creation time as HH:MM in the local timezone
    pub fn format_time(&self) -> String {
        DateTime::from_timestamp_millis(self.created_at)
            .map(|utc| utc.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Serialize a conversation for storage
pub fn encode_conversation(messages: &[Message]) -> Result<String> {
    Ok(serde_json::to_string(messages)?)
}

/// Parse a stored conversation. No reveal job survives a reload, so
/// `streaming` is cleared on every message.
pub fn decode_conversation(raw: &str) -> Result<Vec<Message>> {
    let mut messages: Vec<Message> = serde_json::from_str(raw)?;
    for message in &mut messages {
        message.streaming = false;
    }
    Ok(messages)
}

// ABOUTME: Display grouping of consecutive same-role messages.
// ABOUTME: Pure function computing first/last-in-group, avatar, and timestamp flags.

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Which message of a same-role run carries the timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Timestamp on the final message of a run
    #[default]
    LastInGroup,
    /// Timestamp on the opening message of a run
    FirstInGroup,
}

/// A message annotated for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedMessage {
    pub message: Message,
    pub first_in_group: bool,
    pub last_in_group: bool,
    pub show_avatar: bool,
    pub show_timestamp: bool,
}

/// Annotate each message with its position inside its run of same-role
/// messages. Output has the same length and order as the input.
pub fn group_messages(messages: &[Message], policy: TimestampPolicy) -> Vec<GroupedMessage> {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let first_in_group = i == 0 || messages[i - 1].role != message.role;
            let last_in_group = messages
                .get(i + 1)
                .map_or(true, |next| next.role != message.role);
            let show_timestamp = match policy {
                TimestampPolicy::LastInGroup => last_in_group,
                TimestampPolicy::FirstInGroup => first_in_group,
            };
            GroupedMessage {
                message: message.clone(),
                first_in_group,
                last_in_group,
                show_avatar: last_in_group,
                show_timestamp,
            }
        })
        .collect()
}

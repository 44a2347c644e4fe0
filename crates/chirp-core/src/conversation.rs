// ABOUTME: Synchronous conversation state machine behind the chat engine.
// ABOUTME: Applies sends, delayed replies, reveal ticks, stops, and retries to the message list.

use crate::context::Entropy;
use crate::grouping::{group_messages, GroupedMessage, TimestampPolicy};
use crate::message::Message;
use crate::reply::ReplySource;

/// User text used for a retry when no user message precedes the failed one
pub const DEFAULT_RETRY_TEXT: &str = "Hello";

/// A bot reply waiting for its simulated thinking delay to elapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingReply {
    /// Answer a freshly sent user message
    Reply { user_text: String },
    /// Regenerate a failed bot message in place
    Retry { message_id: String },
}

/// Active reveal job. `revealed` is a byte offset that always sits on a
/// char boundary of `full_text`.
#[derive(Debug)]
struct StreamJob {
    target_id: String,
    full_text: String,
    revealed: usize,
}

/// Result of one reveal tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No job was active
    Idle,
    /// One more character is visible
    Revealed,
    /// The whole reply is visible and the job has ended
    Completed,
}

/// What happened when a pending reply came due
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A reveal job started on this message
    Streaming(String),
    /// A failed bot message was appended
    Failed(String),
    /// A retry whose target is no longer failed
    Dropped,
}

/// Point-in-time view published to readers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<GroupedMessage>,
    pub typing: bool,
    /// False until stored history has been loaded (or found missing)
    pub hydrated: bool,
}

impl ChatSnapshot {
    /// The message currently being revealed, if any
    pub fn streaming(&self) -> Option<&Message> {
        self.messages
            .iter()
            .map(|g| &g.message)
            .find(|m| m.streaming)
    }

    /// Most recent failed bot message
    pub fn latest_failed(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .map(|g| &g.message)
            .find(|m| m.failed)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last().map(|g| &g.message)
    }

    /// Nothing pending and nothing streaming
    pub fn is_settled(&self) -> bool {
        !self.typing && self.streaming().is_none()
    }
}

/// Message list, outstanding reply count, and the reveal job
#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    outstanding: usize,
    job: Option<StreamJob>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while at least one send or retry delay has not fired
    pub fn typing(&self) -> bool {
        self.outstanding > 0
    }

    pub fn streaming_id(&self) -> Option<&str> {
        self.job.as_ref().map(|job| job.target_id.as_str())
    }

    /// Replace the conversation with stored history
    pub fn hydrate(&mut self, mut loaded: Vec<Message>) {
        for message in &mut loaded {
            message.streaming = false;
        }
        self.job = None;
        self.messages = loaded;
    }

    /// Append a user message and return the reply to schedule.
    /// Blank input is ignored.
    pub fn submit(&mut self, text: &str, now: i64) -> Option<PendingReply> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.messages.push(Message::user(trimmed, now));
        self.outstanding += 1;
        Some(PendingReply::Reply {
            user_text: text.to_string(),
        })
    }

    /// Schedule a retry if `message_id` names a failed message
    pub fn request_retry(&mut self, message_id: &str) -> Option<PendingReply> {
        if !self.is_failed(message_id) {
            return None;
        }
        self.outstanding += 1;
        Some(PendingReply::Retry {
            message_id: message_id.to_string(),
        })
    }

    /// Apply a reply whose delay has elapsed.
    ///
    /// A send draws once for failure (`< failure_probability` fails) and
    /// once more for the reply pick. A retry never fails and only draws
    /// for the reply pick.
    pub fn fire(
        &mut self,
        pending: PendingReply,
        now: i64,
        replies: &dyn ReplySource,
        entropy: &mut dyn Entropy,
        failure_probability: f64,
    ) -> Delivery {
        self.outstanding = self.outstanding.saturating_sub(1);

        match pending {
            PendingReply::Reply { user_text } => {
                if entropy.next_unit() < failure_probability {
                    let failed = Message::bot_failed(now);
                    let id = failed.id.clone();
                    self.messages.push(failed);
                    return Delivery::Failed(id);
                }
                let full_text = replies.resolve(&user_text, entropy);
                let bot = Message::bot_streaming(now);
                let id = bot.id.clone();
                self.finish_active();
                self.messages.push(bot);
                self.start_job(id.clone(), full_text);
                Delivery::Streaming(id)
            }
            PendingReply::Retry { message_id } => {
                let Some(index) = self
                    .messages
                    .iter()
                    .position(|m| m.id == message_id && m.failed)
                else {
                    return Delivery::Dropped;
                };
                let user_text = self.messages[..index]
                    .iter()
                    .rev()
                    .find(|m| m.is_user())
                    .map(|m| m.content.clone())
                    .unwrap_or_else(|| DEFAULT_RETRY_TEXT.to_string());
                let full_text = replies.resolve(&user_text, entropy);

                self.finish_active();
                let target = &mut self.messages[index];
                target.content.clear();
                target.failed = false;
                target.streaming = true;
                target.created_at = now;
                self.start_job(message_id.clone(), full_text);
                Delivery::Streaming(message_id)
            }
        }
    }

    /// Reveal one more character of the active job
    pub fn tick(&mut self) -> TickOutcome {
        let Some(job) = self.job.as_mut() else {
            return TickOutcome::Idle;
        };

        if let Some(next) = job.full_text[job.revealed..].chars().next() {
            job.revealed += next.len_utf8();
        }
        let done = job.revealed >= job.full_text.len();
        let visible = &job.full_text[..job.revealed];

        let Some(target) = self.messages.iter_mut().find(|m| m.id == job.target_id) else {
            self.job = None;
            return TickOutcome::Idle;
        };
        target.content = visible.to_string();
        if done {
            target.streaming = false;
            self.job = None;
            TickOutcome::Completed
        } else {
            TickOutcome::Revealed
        }
    }

    /// End the active job early if it targets `message_id`, keeping the
    /// revealed prefix as final content
    pub fn stop(&mut self, message_id: &str) -> bool {
        if self.streaming_id() != Some(message_id) {
            return false;
        }
        self.finish_active();
        true
    }

    pub fn snapshot(&self, policy: TimestampPolicy, hydrated: bool) -> ChatSnapshot {
        ChatSnapshot {
            messages: group_messages(&self.messages, policy),
            typing: self.typing(),
            hydrated,
        }
    }

    fn is_failed(&self, message_id: &str) -> bool {
        self.messages
            .iter()
            .any(|m| m.id == message_id && m.failed)
    }

    fn start_job(&mut self, target_id: String, full_text: String) {
        self.job = Some(StreamJob {
            target_id,
            full_text,
            revealed: 0,
        });
    }

    fn finish_active(&mut self) {
        if let Some(job) = self.job.take() {
            if let Some(target) = self.messages.iter_mut().find(|m| m.id == job.target_id) {
                target.streaming = false;
            }
        }
    }
}

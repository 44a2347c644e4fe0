// ABOUTME: Core library for the chirp simulated assistant
// ABOUTME: Message model, grouping, streaming-reveal engine, replies, and persistence

pub mod config;
pub mod context;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod message;
pub mod reply;
pub mod store;

pub use config::{Config, EngineConfig};
pub use context::{
    Clock, EngineContext, Entropy, ManualClock, ScriptedEntropy, StdEntropy, SystemClock,
};
pub use conversation::{ChatSnapshot, ChatState, Delivery, PendingReply, TickOutcome};
pub use engine::ChatEngine;
pub use error::{ChirpError, Result};
pub use grouping::{group_messages, GroupedMessage, TimestampPolicy};
pub use message::{Message, Role};
pub use reply::{ReplyBook, ReplyCategory, ReplySource};
pub use store::{FileStore, KeyValueStore, MemoryStore, MESSAGES_KEY, THEME_KEY};

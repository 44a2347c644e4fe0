// ABOUTME: Widget module exports.
// ABOUTME: Contains header, chat, typing indicator, and input widgets.

pub mod chat;
pub mod header;
pub mod input;
pub mod typing;

// ABOUTME: Application-wide error types.
// ABOUTME: Uses thiserror for ergonomic error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat error: {0}")]
    Core(#[from] chirp_core::ChirpError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Unknown theme: {name}\n\nAvailable themes:\n{available}")]
    UnknownTheme { name: String, available: String },

    #[error("Nothing to send: message is empty")]
    EmptyMessage,

    #[error("Reply generation failed; open chirp and press Ctrl+R to retry")]
    ReplyFailed,
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Config(format!("{:#}", e))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

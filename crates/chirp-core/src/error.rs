// ABOUTME: Error types for chirp-core
// ABOUTME: Storage, corpus, and engine lifecycle failures

use thiserror::Error;

/// Errors that can occur in chirp-core operations
#[derive(Debug, Error)]
pub enum ChirpError {
    #[error("Storage error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid reply corpus: {0}")]
    Corpus(String),

    #[error("Chat engine has shut down")]
    EngineClosed,
}

pub type Result<T> = std::result::Result<T, ChirpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chirp_error_display_store() {
        let err = ChirpError::Store("disk full".to_string());
        let display = format!("{}", err);
        assert!(display.contains("Storage error"));
        assert!(display.contains("disk full"));
    }

    #[test]
    fn test_chirp_error_display_corpus() {
        let err = ChirpError::Corpus("missing fallback".to_string());
        let display = format!("{}", err);
        assert!(display.contains("Invalid reply corpus"));
        assert!(display.contains("missing fallback"));
    }

    #[test]
    fn test_chirp_error_display_engine_closed() {
        let err = ChirpError::EngineClosed;
        assert_eq!(format!("{}", err), "Chat engine has shut down");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: ChirpError = io.into();
        assert!(matches!(err, ChirpError::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ChirpError = json_err.into();
        assert!(matches!(err, ChirpError::Json(_)));
        assert!(format!("{}", err).contains("JSON error"));
    }
}

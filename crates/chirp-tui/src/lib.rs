// ABOUTME: Library half of the chirp terminal client.
// ABOUTME: Wires config into the store, reply corpus, engine, and theme for the TUI and CLI.

pub mod app;
pub mod cli;
pub mod error;
pub mod theme;
pub mod tui;
pub mod widgets;

use std::sync::Arc;

use chirp_core::{
    ChatEngine, Config, EngineContext, FileStore, KeyValueStore, ReplyBook, ReplySource,
};

use error::Result;
use theme::Theme;

/// File-backed store under the configured data directory
pub fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::new(config.data_path()))
}

/// Built-in replies unless a corpus file is configured
pub fn load_replies(config: &Config) -> Result<Arc<dyn ReplySource>> {
    match &config.replies.corpus_path {
        Some(path) => {
            let book = ReplyBook::load(path)?;
            tracing::info!(path = %path.display(), "Loaded reply corpus");
            Ok(Arc::new(book))
        }
        None => Ok(Arc::new(ReplyBook::builtin())),
    }
}

pub fn engine_context(config: &Config, store: Arc<dyn KeyValueStore>) -> Result<EngineContext> {
    Ok(EngineContext::new(store, load_replies(config)?).with_config(config.engine.clone()))
}

/// Configured theme if one is set, otherwise the stored preference
pub async fn resolve_theme(config: &Config, store: &dyn KeyValueStore) -> Result<&'static Theme> {
    match config.appearance.theme.as_deref() {
        Some(name) => theme::require_theme(name),
        None => Ok(theme::load_preference(store).await),
    }
}

/// Run the interactive chat screen until the user quits
pub async fn run_tui(config: &Config) -> Result<()> {
    let store = open_store(config);
    let theme = resolve_theme(config, store.as_ref()).await?;
    let engine = ChatEngine::spawn(engine_context(config, store.clone())?);

    let mut tui = tui::Tui::new()?;
    let app = app::App::new(engine, store, theme);
    let result = app.run(&mut tui).await;
    tui.restore()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chirp_core::{MemoryStore, THEME_KEY};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_configured_theme_wins_over_stored() {
        let store = MemoryStore::new().with_entry(THEME_KEY, "light");
        let mut config = Config::default();
        assert_eq!(resolve_theme(&config, &store).await.unwrap().name, "light");

        config.apply_overrides(Some("dark"), None);
        assert_eq!(resolve_theme(&config, &store).await.unwrap().name, "dark");
    }

    #[tokio::test]
    async fn test_configured_unknown_theme_is_an_error() {
        let mut config = Config::default();
        config.apply_overrides(Some("neon"), None);
        let err = resolve_theme(&config, &MemoryStore::new()).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownTheme { .. }));
    }

    #[test]
    fn test_missing_corpus_file_is_an_error() {
        let mut config = Config::default();
        config.replies.corpus_path = Some(PathBuf::from("/nonexistent/chirp/replies.json"));
        assert!(matches!(load_replies(&config), Err(AppError::Core(_))));
    }

    #[test]
    fn test_custom_corpus_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("replies.json");
        std::fs::write(&path, r#"[{"category": "fallback", "texts": ["Only this"]}]"#).unwrap();

        let mut config = Config::default();
        config.replies.corpus_path = Some(path);
        let replies = load_replies(&config).unwrap();
        let mut entropy = chirp_core::ScriptedEntropy::new([0.3]);
        assert_eq!(replies.resolve("anything", &mut entropy), "Only this");
    }

    #[tokio::test]
    async fn test_store_lives_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.apply_overrides(None, Some(dir.path()));

        let store = open_store(&config);
        store.save(THEME_KEY, "light").await.unwrap();
        assert_eq!(store.load(THEME_KEY).await.unwrap().as_deref(), Some("light"));
        assert!(std::fs::read_dir(dir.path()).unwrap().count() > 0);
    }
}

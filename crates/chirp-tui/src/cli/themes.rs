// ABOUTME: Themes command implementation.
// ABOUTME: Lists available themes and stores the theme preference.

use chirp_core::{Config, KeyValueStore, THEME_KEY};

use crate::error::Result;
use crate::resolve_theme;
use crate::theme::{self, require_theme};

/// Theme list with the active one marked
pub fn render_list(active: &str) -> String {
    let mut out = String::from("Available themes:\n");
    for name in theme::list_themes() {
        if *name == active {
            out.push_str(&format!("  \u{25cf} {} (active)\n", name));
        } else {
            out.push_str(&format!("    {}\n", name));
        }
    }
    out
}

/// List all available themes, marking the active one.
pub async fn list_themes(config: &Config, store: &dyn KeyValueStore) -> Result<()> {
    let active = resolve_theme(config, store).await?;
    print!("{}", render_list(active.name));
    Ok(())
}

/// Validate and store the theme preference.
pub async fn set_theme(config: &Config, store: &dyn KeyValueStore, name: &str) -> Result<()> {
    let theme = require_theme(name.trim())?;
    store.save(THEME_KEY, theme.name).await?;

    println!("Theme set to: {}", theme.name);
    if let Some(forced) = config.appearance.theme.as_deref() {
        if forced != theme.name {
            println!("Note: the configured theme \"{}\" still takes precedence", forced);
        }
    }
    Ok(())
}

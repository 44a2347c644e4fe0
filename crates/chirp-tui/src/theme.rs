// ABOUTME: Two-palette theme system with semantic color roles.
// ABOUTME: Dark and light palettes plus the persisted theme preference.

use chirp_core::{KeyValueStore, THEME_KEY};
use crate::error::{AppError, Result};
use ratatui::style::Color;

#[derive(Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub surface: Color,
    pub surface_alt: Color,
    pub border: Color,
    pub primary: Color,
    pub primary_text: Color,
    pub text: Color,
    pub text_dim: Color,
    pub danger: Color,
    pub accent: Color,
    pub bubble_user: Color,
    pub bubble_bot: Color,
    pub input_bg: Color,
}

pub static DARK_THEME: Theme = Theme {
    name: "dark",
    background: Color::Rgb(15, 17, 21),
    surface: Color::Rgb(18, 22, 28),
    surface_alt: Color::Rgb(31, 41, 55),
    border: Color::Rgb(31, 36, 44),
    primary: Color::Rgb(37, 99, 235),
    primary_text: Color::Rgb(255, 255, 255),
    text: Color::Rgb(243, 244, 246),
    text_dim: Color::Rgb(156, 163, 175),
    danger: Color::Rgb(220, 38, 38),
    accent: Color::Rgb(124, 58, 237),
    bubble_user: Color::Rgb(37, 99, 235),
    bubble_bot: Color::Rgb(31, 41, 55),
    input_bg: Color::Rgb(31, 41, 55),
};

pub static LIGHT_THEME: Theme = Theme {
    name: "light",
    background: Color::Rgb(243, 244, 246),
    surface: Color::Rgb(255, 255, 255),
    surface_alt: Color::Rgb(229, 231, 235),
    border: Color::Rgb(209, 213, 219),
    primary: Color::Rgb(37, 99, 235),
    primary_text: Color::Rgb(255, 255, 255),
    text: Color::Rgb(31, 41, 55),
    text_dim: Color::Rgb(75, 85, 99),
    danger: Color::Rgb(220, 38, 38),
    accent: Color::Rgb(124, 58, 237),
    bubble_user: Color::Rgb(37, 99, 235),
    bubble_bot: Color::Rgb(229, 231, 235),
    input_bg: Color::Rgb(255, 255, 255),
};

/// Look up a theme by name
pub fn find_theme(name: &str) -> Option<&'static Theme> {
    match name {
        "dark" => Some(&DARK_THEME),
        "light" => Some(&LIGHT_THEME),
        _ => None,
    }
}

/// Look up a theme by name, falling back to dark
pub fn get_theme(name: &str) -> &'static Theme {
    find_theme(name).unwrap_or(&DARK_THEME)
}

pub fn list_themes() -> &'static [&'static str] {
    &["dark", "light"]
}

/// Look up a theme by name, failing with the list of known names
pub fn require_theme(name: &str) -> Result<&'static Theme> {
    find_theme(name).ok_or_else(|| AppError::UnknownTheme {
        name: name.to_string(),
        available: list_themes()
            .iter()
            .map(|t| format!("  {}", t))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// The other palette
pub fn toggled(theme: &Theme) -> &'static Theme {
    if theme.name == DARK_THEME.name {
        &LIGHT_THEME
    } else {
        &DARK_THEME
    }
}

/// Read the stored preference. Only an explicit "light" selects the light
/// palette; anything else, including a failed read, means dark.
pub async fn load_preference(store: &dyn KeyValueStore) -> &'static Theme {
    match store.load(THEME_KEY).await {
        Ok(Some(name)) if name.trim() == LIGHT_THEME.name => &LIGHT_THEME,
        Ok(_) => &DARK_THEME,
        Err(e) => {
            tracing::warn!("Failed to load theme preference: {}", e);
            &DARK_THEME
        }
    }
}

/// Persist the preference, logging failures
pub async fn save_preference(store: &dyn KeyValueStore, theme: &Theme) {
    if let Err(e) = store.save(THEME_KEY, theme.name).await {
        tracing::warn!("Failed to save theme preference: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_core::MemoryStore;
    use insta::assert_snapshot;

    fn theme_to_snapshot(theme: &Theme) -> String {
        let color_to_str = |c: Color| -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                other => format!("{:?}", other),
            }
        };

        [
            ("background", theme.background),
            ("surface", theme.surface),
            ("surface_alt", theme.surface_alt),
            ("border", theme.border),
            ("primary", theme.primary),
            ("primary_text", theme.primary_text),
            ("text", theme.text),
            ("text_dim", theme.text_dim),
            ("danger", theme.danger),
            ("accent", theme.accent),
            ("bubble_user", theme.bubble_user),
            ("bubble_bot", theme.bubble_bot),
            ("input_bg", theme.input_bg),
        ]
        .iter()
        .map(|(role, color)| format!("{}: {}", role, color_to_str(*color)))
        .collect::<Vec<_>>()
        .join("\n")
    }

    #[test]
    fn test_dark_theme_snapshot() {
        assert_snapshot!(theme_to_snapshot(&DARK_THEME), @r###"
        background: #0F1115
        surface: #12161C
        surface_alt: #1F2937
        border: #1F242C
        primary: #2563EB
        primary_text: #FFFFFF
        text: #F3F4F6
        text_dim: #9CA3AF
        danger: #DC2626
        accent: #7C3AED
        bubble_user: #2563EB
        bubble_bot: #1F2937
        input_bg: #1F2937
        "###);
    }

    #[test]
    fn test_light_theme_snapshot() {
        assert_snapshot!(theme_to_snapshot(&LIGHT_THEME), @r###"
        background: #F3F4F6
        surface: #FFFFFF
        surface_alt: #E5E7EB
        border: #D1D5DB
        primary: #2563EB
        primary_text: #FFFFFF
        text: #1F2937
        text_dim: #4B5563
        danger: #DC2626
        accent: #7C3AED
        bubble_user: #2563EB
        bubble_bot: #E5E7EB
        input_bg: #FFFFFF
        "###);
    }

    #[test]
    fn test_theme_list_snapshot() {
        assert_snapshot!(list_themes().join("\n"), @r###"
        dark
        light
        "###);
    }

    #[test]
    fn test_get_theme_returns_correct_theme() {
        assert_eq!(get_theme("dark").name, "dark");
        assert_eq!(get_theme("light").name, "light");
    }

    #[test]
    fn test_get_theme_unknown_returns_dark() {
        assert_eq!(get_theme("unknown").name, "dark");
        assert!(find_theme("unknown").is_none());
    }

    #[test]
    fn test_require_theme_lists_known_names() {
        assert_eq!(require_theme("light").unwrap().name, "light");
        let err = require_theme("neon").unwrap_err();
        assert_snapshot!(err.to_string(), @r###"
        Unknown theme: neon

        Available themes:
          dark
          light
        "###);
    }

    #[test]
    fn test_toggle_flips_between_palettes() {
        assert_eq!(toggled(&DARK_THEME).name, "light");
        assert_eq!(toggled(&LIGHT_THEME).name, "dark");
        assert_eq!(toggled(toggled(&DARK_THEME)).name, "dark");
    }

    #[test]
    fn test_light_theme_has_light_background() {
        if let Color::Rgb(r, g, b) = LIGHT_THEME.background {
            assert!(r > 200 && g > 200 && b > 200);
        } else {
            panic!("Expected RGB color");
        }
    }

    #[tokio::test]
    async fn test_preference_round_trips_through_store() {
        let store = MemoryStore::new();
        assert_eq!(load_preference(&store).await.name, "dark");

        save_preference(&store, &LIGHT_THEME).await;
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(load_preference(&store).await.name, "light");

        save_preference(&store, toggled(&LIGHT_THEME)).await;
        assert_eq!(load_preference(&store).await.name, "dark");
    }

    #[tokio::test]
    async fn test_unreadable_preference_means_dark() {
        let store = MemoryStore::new().with_entry(THEME_KEY, "light");
        store.set_fail_loads(true);
        assert_eq!(load_preference(&store).await.name, "dark");

        let odd = MemoryStore::new().with_entry(THEME_KEY, "sepia");
        assert_eq!(load_preference(&odd).await.name, "dark");
    }

    #[tokio::test]
    async fn test_failed_save_is_swallowed() {
        let store = MemoryStore::new();
        store.set_fail_saves(true);
        save_preference(&store, &LIGHT_THEME).await;
        assert!(store.get(THEME_KEY).is_none());
    }
}

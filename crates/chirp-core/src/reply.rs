// ABOUTME: Canned reply selection for the simulated assistant.
// ABOUTME: Keyword table picks a category, entropy picks a text from its pool.

use crate::context::Entropy;
use crate::error::{ChirpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Category used when no keyword matches or the matched pool is empty
pub const FALLBACK_CATEGORY: &str = "fallback";

/// Ordered keyword table. The first keyword found in the lowercased input wins.
const KEYWORDS: &[(&str, &str)] = &[
    ("react", "tech"),
    ("native", "tech"),
    ("code", "tech"),
    ("hello", "greeting"),
    ("hi", "greeting"),
    ("fun", "fun"),
    ("fact", "fun"),
];

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "greeting",
        &[
            "Hey there! What would you like to talk about today?",
            "Hi! Good to see you. Ask me anything.",
            "Hello! I'm a simulated assistant, but I'm all ears.",
        ],
    ),
    (
        "tech",
        &[
            "Component-driven UIs shine when state lives in one place and views stay dumb.",
            "A good rule for native apps: keep the main thread free and push work to the background.",
            "When code gets hard to test, it usually wants to be split along its side effects.",
            "Streaming responses feel faster because people start reading before the work is done.",
        ],
    ),
    (
        "fun",
        &[
            "Fun fact: octopuses have three hearts and blue blood.",
            "Fun fact: honey found in ancient tombs was still edible.",
            "Fun fact: a day on Venus is longer than its year.",
        ],
    ),
    (
        FALLBACK_CATEGORY,
        &[
            "Interesting! Tell me more.",
            "I'm not sure I follow, could you rephrase that?",
            "That's a good question. Let me think out loud for a second.",
            "Noted. Anything else on your mind?",
        ],
    ),
];

/// Resolves a reply text for a piece of user input
pub trait ReplySource: Send + Sync {
    fn resolve(&self, user_text: &str, entropy: &mut dyn Entropy) -> String;
}

/// A named pool of reply texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyCategory {
    pub category: String,
    pub texts: Vec<String>,
}

/// Reply corpus with keyword-driven category lookup
#[derive(Debug, Clone)]
pub struct ReplyBook {
    categories: Vec<ReplyCategory>,
}

impl ReplyBook {
    /// The corpus compiled into the binary
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(category, texts)| ReplyCategory {
                category: category.to_string(),
                texts: texts.iter().map(|t| t.to_string()).collect(),
            })
            .collect();
        Self { categories }
    }

    /// Build a corpus, requiring a non-empty fallback pool
    pub fn from_categories(categories: Vec<ReplyCategory>) -> Result<Self> {
        let has_fallback = categories
            .iter()
            .any(|c| c.category == FALLBACK_CATEGORY && !c.texts.is_empty());
        if !has_fallback {
            return Err(ChirpError::Corpus(format!(
                "corpus needs a non-empty '{}' category",
                FALLBACK_CATEGORY
            )));
        }
        Ok(Self { categories })
    }

    /// Parse a JSON array of `{ "category": ..., "texts": [...] }`
    pub fn from_json(raw: &str) -> Result<Self> {
        let categories: Vec<ReplyCategory> = serde_json::from_str(raw)?;
        Self::from_categories(categories)
    }

    /// Load a JSON corpus from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Category name the keyword table assigns to this input
    pub fn category_for(&self, user_text: &str) -> &'static str {
        let lowered = user_text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    fn pool(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.texts.as_slice())
            .filter(|texts| !texts.is_empty())
    }

    pub fn categories(&self) -> &[ReplyCategory] {
        &self.categories
    }
}

impl Default for ReplyBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReplySource for ReplyBook {
    fn resolve(&self, user_text: &str, entropy: &mut dyn Entropy) -> String {
        let category = self.category_for(user_text);
        let Some(pool) = self.pool(category).or_else(|| self.pool(FALLBACK_CATEGORY)) else {
            return String::new();
        };
        let index = ((entropy.next_unit() * pool.len() as f64) as usize).min(pool.len() - 1);
        tracing::debug!(category, index, "resolved reply");
        pool[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScriptedEntropy;

    fn pick(book: &ReplyBook, text: &str, sample: f64) -> String {
        book.resolve(text, &mut ScriptedEntropy::new([sample]))
    }

    #[test]
    fn test_keyword_categories() {
        let book = ReplyBook::builtin();
        assert_eq!(book.category_for("I love React"), "tech");
        assert_eq!(book.category_for("native modules"), "tech");
        assert_eq!(book.category_for("show me CODE"), "tech");
        assert_eq!(book.category_for("HELLO there"), "greeting");
        assert_eq!(book.category_for("hi"), "greeting");
        assert_eq!(book.category_for("something fun"), "fun");
        assert_eq!(book.category_for("random fact"), "fun");
        assert_eq!(book.category_for("weather tomorrow?"), "fallback");
    }

    #[test]
    fn test_first_keyword_in_table_wins() {
        let book = ReplyBook::builtin();
        // "hello" precedes "fun" in the table
        assert_eq!(book.category_for("fun hello"), "greeting");
        // "code" precedes "hi"
        assert_eq!(book.category_for("hi, code please"), "tech");
    }

    #[test]
    fn test_substring_match_is_loose() {
        // "this" contains "hi"
        let book = ReplyBook::builtin();
        assert_eq!(book.category_for("this one"), "greeting");
    }

    #[test]
    fn test_resolve_picks_from_category_pool() {
        let book = ReplyBook::builtin();
        let tech = book.pool("tech").unwrap().to_vec();
        assert_eq!(pick(&book, "react", 0.0), tech[0]);
        assert_eq!(pick(&book, "react", 0.999), tech[tech.len() - 1]);
    }

    #[test]
    fn test_resolve_falls_back_without_keyword() {
        let book = ReplyBook::builtin();
        let fallback = book.pool(FALLBACK_CATEGORY).unwrap().to_vec();
        assert!(fallback.contains(&pick(&book, "zzz", 0.3)));
    }

    #[test]
    fn test_resolve_falls_back_when_category_missing() {
        let book = ReplyBook::from_json(
            r#"[{"category":"fallback","texts":["only this"]},{"category":"tech","texts":[]}]"#,
        )
        .unwrap();
        assert_eq!(pick(&book, "react", 0.5), "only this");
        assert_eq!(pick(&book, "hello", 0.5), "only this");
    }

    #[test]
    fn test_corpus_requires_fallback() {
        let err = ReplyBook::from_json(r#"[{"category":"tech","texts":["a"]}]"#).unwrap_err();
        assert!(matches!(err, ChirpError::Corpus(_)));

        let err = ReplyBook::from_json(r#"[{"category":"fallback","texts":[]}]"#).unwrap_err();
        assert!(matches!(err, ChirpError::Corpus(_)));
    }

    #[test]
    fn test_corpus_rejects_bad_json() {
        let err = ReplyBook::from_json("[{").unwrap_err();
        assert!(matches!(err, ChirpError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("replies.json");
        std::fs::write(&path, r#"[{"category":"fallback","texts":["from disk"]}]"#).unwrap();
        let book = ReplyBook::load(&path).unwrap();
        assert_eq!(pick(&book, "anything", 0.0), "from disk");
    }

    #[test]
    fn test_builtin_has_every_keyword_category() {
        let book = ReplyBook::builtin();
        for (_, category) in KEYWORDS {
            assert!(book.pool(category).is_some(), "missing pool for {category}");
        }
        assert!(book.pool(FALLBACK_CATEGORY).is_some());
    }
}

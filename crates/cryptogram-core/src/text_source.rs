//! Practice text collaborator.
//!
//! A [`TextSource`] turns a topic into a short sentence. Sources may fail;
//! [`practice_text`] never does and falls back to [`FALLBACK_TEXT`].

use crate::Result;
use tracing::warn;

/// Sentence used whenever a source fails or returns nothing usable
pub const FALLBACK_TEXT: &str = "El sol brilla en el cielo azul.";

/// Upper bound on words kept from a generated text
pub const MAX_WORDS: usize = 25;

/// Something that can write a practice sentence about a topic
pub trait TextSource: Send + Sync {
    fn fetch(&self, topic: &str) -> Result<String>;

    /// Source name for display
    fn name(&self) -> &'static str;
}

/// Prompt sent to generative sources
pub fn practice_prompt(topic: &str) -> String {
    format!(
        "Genera una frase o un párrafo corto (máximo {} palabras) en español sobre el tema: \"{}\". \
         El texto está dirigido a niños con dislexia, así que usa vocabulario sencillo, \
         estructura directa (sujeto + verbo + predicado) y evita palabras excesivamente complejas. \
         Devuelve SOLO el texto plano, sin comillas ni formato markdown.",
        MAX_WORDS,
        topic.trim()
    )
}

/// Strip quoting and markdown emphasis, collapse whitespace and keep at most
/// [`MAX_WORDS`] words. `None` when nothing is left.
pub fn clean_generated(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| w.trim_matches(|c| matches!(c, '"' | '*' | '`' | '_' | '#' | '«' | '»' | '“' | '”')))
        .filter(|w| !w.is_empty())
        .take(MAX_WORDS)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Ask `source` for a sentence about `topic`. Any failure degrades to
/// [`FALLBACK_TEXT`].
pub fn practice_text(source: &dyn TextSource, topic: &str) -> String {
    match source.fetch(topic) {
        Ok(raw) => clean_generated(&raw).unwrap_or_else(|| {
            warn!(source = source.name(), "empty practice text");
            FALLBACK_TEXT.to_string()
        }),
        Err(e) => {
            warn!(source = source.name(), error = %e, "practice text unavailable");
            FALLBACK_TEXT.to_string()
        }
    }
}

/// Source that always answers with the same text
#[derive(Debug, Clone)]
pub struct StaticTextSource {
    text: String,
}

impl StaticTextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for StaticTextSource {
    fn default() -> Self {
        Self::new(FALLBACK_TEXT)
    }
}

impl TextSource for StaticTextSource {
    fn fetch(&self, _topic: &str) -> Result<String> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &'static str {
        "Static"
    }
}

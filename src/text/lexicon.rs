// Term predicates for vocabulary construction.
//
// A term enters the vocabulary only if the lexicon accepts it and it is not a
// stopword. The lexicon is a trait so a real dictionary (a word-list file) can
// replace the default alphabetic check without touching the builder.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use stop_words::{get, LANGUAGE};
use tracing::info;

/// Lexicon validity check: is this token a real word?
pub trait Lexicon: Send + Sync {
    fn contains(&self, word: &str) -> bool;
}

/// Default lexicon: accepts lowercase alphabetic words of two or more letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphabeticLexicon;

impl Lexicon for AlphabeticLexicon {
    fn contains(&self, word: &str) -> bool {
        word.chars().count() >= 2 && word.chars().all(|c| c.is_alphabetic() && !c.is_uppercase())
    }
}

/// Lexicon backed by a word list, one word per line (e.g. /usr/share/dict/words).
/// Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct WordListLexicon {
    words: HashSet<String>,
}

impl WordListLexicon {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon word list {}", path.display()))?;
        let lexicon = Self::from_words(text.lines());
        info!(words = lexicon.len(), path = %path.display(), "Loaded lexicon word list");
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Lexicon for WordListLexicon {
    fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Stopword membership set.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The English list shipped with the `stop-words` crate.
    pub fn english() -> Self {
        let words: Vec<String> = get(LANGUAGE::English);
        Self::from_words(words)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// Drop `words` from the set, so they survive cleaning and filtering.
    pub fn without<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.words.remove(&word.as_ref().to_lowercase());
        }
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

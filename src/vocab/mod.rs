// Vocabulary — the fixed, ordered term set a model is trained against.
//
// Terms keep first-seen order: the first document that contributes a term
// decides its position, and rebuilding from the same corpus gives the same
// indices. The fingerprint hashes the ordering policy and the ordered terms,
// so a model can refuse documents encoded against any other vocabulary.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::TopicError;
use crate::text::{Lexicon, StopWords};

/// Ordering policy tag, hashed into every fingerprint.
pub const ORDERING_POLICY: &str = "first-seen";

/// An ordered, duplicate-free term list with a term -> index map.
///
/// Indices are 0-based internally; the LDA-C encoding adds one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from terms in the given order, dropping repeats.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for term in terms {
            vocab.insert(term.into());
        }
        vocab
    }

    fn insert(&mut self, term: String) {
        if !self.index.contains_key(&term) {
            self.index.insert(term.clone(), self.terms.len());
            self.terms.push(term);
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// 0-based index of a term, if present.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// Hex SHA-256 over the ordering policy and the ordered terms.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ORDERING_POLICY.as_bytes());
        for term in &self.terms {
            hasher.update(b"\n");
            hasher.update(term.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Parse vocabulary file contents: one term per line, line position =
    /// index. A blank or repeated line would shift every later index, so
    /// both are rejected.
    pub fn parse(text: &str) -> Result<Self, TopicError> {
        let mut vocab = Self::default();
        for (n, line) in text.lines().enumerate() {
            let term = line.trim();
            if term.is_empty() {
                return Err(TopicError::encoding(format!(
                    "vocabulary line {}: blank line",
                    n + 1
                )));
            }
            if let Some(first) = vocab.index_of(term) {
                return Err(TopicError::encoding(format!(
                    "vocabulary line {}: {term:?} already on line {}",
                    n + 1,
                    first + 1
                )));
            }
            vocab.insert(term.to_string());
        }
        Ok(vocab)
    }

    /// Load a vocabulary file written by [`Vocabulary::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary {}", path.display()))?;
        let vocab = Self::parse(&text)
            .with_context(|| format!("Invalid vocabulary file {}", path.display()))?;
        info!(terms = vocab.len(), path = %path.display(), "Loaded vocabulary");
        Ok(vocab)
    }

    /// Write the vocabulary file, replacing any existing one.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }
        let mut text = self.terms.join("\n");
        text.push('\n');
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write vocabulary {}", path.display()))?;
        Ok(())
    }
}

/// Derives a vocabulary from cleaned documents using lexicon and stopword
/// predicates.
pub struct VocabularyBuilder {
    lexicon: Box<dyn Lexicon>,
    stop_words: StopWords,
}

impl VocabularyBuilder {
    pub fn new(lexicon: Box<dyn Lexicon>, stop_words: StopWords) -> Self {
        Self {
            lexicon,
            stop_words,
        }
    }

    /// Accept a term only if the lexicon knows it and it isn't a stopword.
    pub fn accepts(&self, term: &str) -> bool {
        self.lexicon.contains(term) && !self.stop_words.contains(term)
    }

    /// Build the vocabulary in first-seen order. An empty corpus gives an
    /// empty vocabulary.
    pub fn build<S: AsRef<str>>(&self, documents: &[S]) -> Vocabulary {
        self.extend(Vocabulary::default(), documents)
    }

    /// Append new accepted terms to an existing vocabulary. Existing terms
    /// keep their indices; new ones follow in first-seen order.
    pub fn extend<S: AsRef<str>>(&self, base: Vocabulary, documents: &[S]) -> Vocabulary {
        let mut vocab = base;
        let base_len = vocab.len();
        let mut rejected = 0usize;

        for doc in documents {
            for term in doc.as_ref().split_whitespace() {
                if vocab.contains(term) {
                    continue;
                }
                if self.accepts(term) {
                    vocab.insert(term.to_string());
                } else {
                    rejected += 1;
                }
            }
        }

        debug!(rejected, "Terms rejected by lexicon or stopword filter");
        info!(
            documents = documents.len(),
            terms = vocab.len(),
            added = vocab.len() - base_len,
            "Built vocabulary"
        );
        vocab
    }
}

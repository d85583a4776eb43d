// Encoded corpus — an ordered list of encoded documents tagged with the
// fingerprint of the vocabulary they were encoded against.
//
// Position i in the corpus is post i. The fingerprint travels with the
// corpus so inference can reject documents from a different vocabulary.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::sparse::{encode_document, parse_line, EncodedDocument};
use crate::error::TopicError;
use crate::vocab::Vocabulary;

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCorpus {
    pub vocab_fingerprint: String,
    pub vocab_size: usize,
    pub documents: Vec<EncodedDocument>,
}

impl EncodedCorpus {
    /// Encode every document, one output document per input document.
    pub fn encode<S: AsRef<str>>(
        documents: &[S],
        vocab: &Vocabulary,
    ) -> Result<Self, TopicError> {
        let documents = documents
            .iter()
            .map(|doc| encode_document(doc.as_ref(), vocab))
            .collect::<Result<Vec<_>, _>>()?;

        let placeholders = documents.iter().filter(|d| d.is_placeholder()).count();
        info!(
            documents = documents.len(),
            placeholders, "Encoded corpus"
        );

        Ok(Self {
            vocab_fingerprint: vocab.fingerprint(),
            vocab_size: vocab.len(),
            documents,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total token occurrences across all documents.
    pub fn total_tokens(&self) -> usize {
        self.documents.iter().map(EncodedDocument::total_tokens).sum()
    }

    /// Render the corpus as LDA-C text, one line per document.
    pub fn to_ldac(&self) -> String {
        let mut out = String::new();
        for doc in &self.documents {
            out.push_str(&doc.to_line());
            out.push('\n');
        }
        out
    }

    /// Parse LDA-C text against a vocabulary. Every line is a document, so
    /// blank lines are rejected rather than skipped.
    pub fn from_ldac(text: &str, vocab: &Vocabulary) -> Result<Self, TopicError> {
        if vocab.is_empty() {
            return Err(TopicError::encoding(
                "cannot read LDA-C against an empty vocabulary",
            ));
        }
        let documents = text
            .lines()
            .enumerate()
            .map(|(i, line)| {
                parse_line(line, vocab.len()).map_err(|e| match e {
                    TopicError::Encoding(msg) => {
                        TopicError::encoding(format!("line {}: {msg}", i + 1))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            vocab_fingerprint: vocab.fingerprint(),
            vocab_size: vocab.len(),
            documents,
        })
    }

    pub fn write_ldac(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create LDA-C file {}", path.display()))?;
        file.write_all(self.to_ldac().as_bytes())
            .with_context(|| format!("Failed to write LDA-C file {}", path.display()))?;
        Ok(())
    }

    pub fn read_ldac(path: &Path, vocab: &Vocabulary) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read LDA-C file {}", path.display()))?;
        Ok(Self::from_ldac(&text, vocab)?)
    }
}

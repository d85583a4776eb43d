// Sparse document vectors in LDA-C line format.
//
//   <unique_term_count> <idx1>:<freq1> <idx2>:<freq2> ...
//
// Indices are 1-based on the wire and always written in ascending index
// order. The sort is on the resolved index, not the term text: the vocabulary
// is in first-seen order, so alphabetical order would scramble the indices.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::TopicError;
use crate::vocab::Vocabulary;

/// 0-based vocabulary index written for documents with no vocabulary overlap
/// (`1 1:1` on the wire).
pub const PLACEHOLDER_INDEX: usize = 0;

/// One (term, count) entry of a sparse document. `index` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCount {
    pub index: usize,
    pub count: u32,
}

/// A document as sparse term counts, sorted by ascending index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    terms: Vec<TermCount>,
    placeholder: bool,
}

impl EncodedDocument {
    /// Build from arbitrary (index, count) pairs; repeats are summed, zero
    /// counts dropped, and the result sorted by index.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (usize, u32)>,
    {
        let mut merged: BTreeMap<usize, u32> = BTreeMap::new();
        for (index, count) in counts {
            if count > 0 {
                *merged.entry(index).or_insert(0) += count;
            }
        }
        Self {
            terms: merged
                .into_iter()
                .map(|(index, count)| TermCount { index, count })
                .collect(),
            placeholder: false,
        }
    }

    /// The reserved stand-in for a document that shares no term with the
    /// vocabulary.
    pub fn placeholder() -> Self {
        Self {
            terms: vec![TermCount {
                index: PLACEHOLDER_INDEX,
                count: 1,
            }],
            placeholder: true,
        }
    }

    pub fn terms(&self) -> &[TermCount] {
        &self.terms
    }

    /// True when this document was produced by the empty-overlap rule.
    /// Documents read back from an LDA-C file are never flagged.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Total token count (sum of frequencies).
    pub fn total_tokens(&self) -> usize {
        self.terms.iter().map(|t| t.count as usize).sum()
    }

    /// Expand into one vocabulary index per token occurrence, in index order.
    pub fn tokens(&self) -> Vec<usize> {
        self.terms
            .iter()
            .flat_map(|t| std::iter::repeat(t.index).take(t.count as usize))
            .collect()
    }

    /// Render as an LDA-C line (without the trailing newline).
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EncodedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terms.len())?;
        for t in &self.terms {
            write!(f, " {}:{}", t.index + 1, t.count)?;
        }
        Ok(())
    }
}

/// Encode a cleaned, whitespace-tokenized document against a vocabulary.
///
/// Out-of-vocabulary tokens are dropped. When nothing survives, the
/// placeholder document is returned instead of an empty one.
pub fn encode_document(doc: &str, vocab: &Vocabulary) -> Result<EncodedDocument, TopicError> {
    if vocab.is_empty() {
        return Err(TopicError::encoding(
            "cannot encode against an empty vocabulary",
        ));
    }

    let encoded = EncodedDocument::from_counts(
        doc.split_whitespace()
            .filter_map(|token| vocab.index_of(token))
            .map(|index| (index, 1)),
    );

    if encoded.terms.is_empty() {
        Ok(EncodedDocument::placeholder())
    } else {
        Ok(encoded)
    }
}

/// Parse one LDA-C line. `vocab_size` bounds the accepted indices.
///
/// The leading count must match the number of pairs. Pairs may arrive in any
/// order; they are stored sorted. A repeated index, a zero frequency or a
/// line without pairs is rejected.
pub fn parse_line(line: &str, vocab_size: usize) -> Result<EncodedDocument, TopicError> {
    let mut fields = line.split_whitespace();
    let declared: usize = fields
        .next()
        .ok_or_else(|| TopicError::encoding("empty LDA-C line"))?
        .parse()
        .map_err(|_| TopicError::encoding(format!("bad term count in line: {line:?}")))?;

    let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
    for pair in fields {
        let (idx, freq) = pair
            .split_once(':')
            .ok_or_else(|| TopicError::encoding(format!("bad pair {pair:?}")))?;
        let idx: usize = idx
            .parse()
            .map_err(|_| TopicError::encoding(format!("bad index in pair {pair:?}")))?;
        let freq: u32 = freq
            .parse()
            .map_err(|_| TopicError::encoding(format!("bad frequency in pair {pair:?}")))?;
        if freq == 0 {
            return Err(TopicError::encoding(format!("zero frequency in pair {pair:?}")));
        }

        if idx == 0 || idx > vocab_size {
            return Err(TopicError::encoding(format!(
                "index {idx} outside vocabulary of {vocab_size} terms"
            )));
        }
        if counts.insert(idx - 1, freq).is_some() {
            return Err(TopicError::encoding(format!("index {idx} repeated")));
        }
    }

    if counts.is_empty() {
        return Err(TopicError::encoding(format!("line lists no terms: {line:?}")));
    }
    if counts.len() != declared {
        return Err(TopicError::encoding(format!(
            "line declares {declared} terms but lists {}",
            counts.len()
        )));
    }

    Ok(EncodedDocument::from_counts(counts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_terms(["game", "win", "stock", "price", "policy"])
    }

    #[test]
    fn test_encode_counts_and_order() {
        let doc = encode_document("game win great game", &vocab()).unwrap();
        assert_eq!(doc.to_line(), "2 1:2 2:1");
        assert!(!doc.is_placeholder());
        assert_eq!(doc.total_tokens(), 3);
    }

    #[test]
    fn test_encode_sorts_by_index_not_text() {
        // Alphabetically "policy" < "stock" < "win", but indices are 5, 3, 2.
        let doc = encode_document("win stock policy", &vocab()).unwrap();
        assert_eq!(doc.to_line(), "3 2:1 3:1 5:1");
    }

    #[test]
    fn test_encode_no_overlap_is_placeholder() {
        let doc = encode_document("weather weather", &vocab()).unwrap();
        assert!(doc.is_placeholder());
        assert_eq!(doc.to_line(), "1 1:1");

        let empty = encode_document("", &vocab()).unwrap();
        assert!(empty.is_placeholder());
    }

    #[test]
    fn test_encode_empty_vocabulary_fails() {
        let err = encode_document("game", &Vocabulary::default()).unwrap_err();
        assert!(matches!(err, TopicError::Encoding(_)));
    }

    #[test]
    fn test_parse_line_accepts_unsorted() {
        let doc = parse_line("2 3:1 1:4", 5).unwrap();
        assert_eq!(doc.to_line(), "2 1:4 3:1");
        assert_eq!(doc.tokens(), vec![0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_parse_line_rejects_bad_input() {
        assert!(parse_line("", 5).is_err());
        assert!(parse_line("1 6:1", 5).is_err());
        assert!(parse_line("1 0:1", 5).is_err());
        assert!(parse_line("2 1:1", 5).is_err());
        assert!(parse_line("2 1:1 1:2", 5).is_err());
        assert!(parse_line("1 1-1", 5).is_err());
    }
}

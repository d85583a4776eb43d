// Seed topics — analyst-supplied words that pull a topic toward a theme.
//
// Topic index is the position in the list. Each topic may carry its own
// confidence; otherwise the training confidence applies. Seed words are
// resolved against the vocabulary before any sampling happens: a missing
// word is a configuration error, never silently skipped.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::TopicError;
use crate::vocab::Vocabulary;

/// Seed words for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedTopic {
    pub words: Vec<String>,
    /// Overrides the training confidence for this topic's words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A seed word resolved to its vocabulary index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedAssignment {
    pub term_index: usize,
    pub topic: usize,
    pub confidence: f64,
}

/// Ordered seed topic lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedTopics {
    topics: Vec<SeedTopic>,
}

impl SeedTopics {
    pub fn new(topics: Vec<SeedTopic>) -> Self {
        Self { topics }
    }

    /// Seed lists using the training confidence for every topic.
    pub fn from_word_lists(lists: &[&[&str]]) -> Self {
        Self::new(
            lists
                .iter()
                .map(|words| SeedTopic {
                    words: words.iter().map(|w| w.to_string()).collect(),
                    confidence: None,
                })
                .collect(),
        )
    }

    /// Built-in seeds: Sports, Business, Arts/Literature, Politics.
    /// The fifth topic (Misc) is left unseeded.
    pub fn default_topics() -> Self {
        Self::from_word_lists(&[
            &[
                "game", "sport", "soccer", "football", "team", "win", "player", "season",
                "second", "victory",
            ],
            &[
                "percent", "company", "market", "price", "sell", "business", "stock", "share",
            ],
            &["music", "write", "art", "book", "world", "film"],
            &[
                "political", "government", "leader", "official", "state", "country",
                "american", "case", "law", "police", "charge", "officer", "kill", "arrest",
                "lawyer",
            ],
        ])
    }

    /// Load seeds from JSON: `[{"words": [...], "confidence": 0.5}, ...]`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed topics {}", path.display()))?;
        let seeds: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse seed topics {}", path.display()))?;
        Ok(seeds)
    }

    pub fn topics(&self) -> &[SeedTopic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Resolve every seed word to a vocabulary index.
    ///
    /// Fails when a word is missing from the vocabulary (all missing words are
    /// listed), when there are more seed topics than `n_topics`, when a
    /// confidence falls outside [0, 1], or when one word is seeded into two
    /// different topics.
    pub fn resolve(
        &self,
        vocab: &Vocabulary,
        n_topics: usize,
        default_confidence: f64,
    ) -> Result<Vec<SeedAssignment>, TopicError> {
        if self.topics.len() > n_topics {
            return Err(TopicError::configuration(format!(
                "{} seed topics given for a {n_topics}-topic model",
                self.topics.len()
            )));
        }

        let mut missing: Vec<&str> = Vec::new();
        let mut by_term: HashMap<usize, usize> = HashMap::new();
        let mut assignments = Vec::new();

        for (topic, seed) in self.topics.iter().enumerate() {
            let confidence = seed.confidence.unwrap_or(default_confidence);
            if !(0.0..=1.0).contains(&confidence) {
                return Err(TopicError::configuration(format!(
                    "seed confidence {confidence} for topic {topic} is outside [0, 1]"
                )));
            }

            for word in &seed.words {
                let Some(term_index) = vocab.index_of(word) else {
                    missing.push(word.as_str());
                    continue;
                };
                match by_term.get(&term_index) {
                    Some(&existing) if existing == topic => continue,
                    Some(&existing) => {
                        return Err(TopicError::configuration(format!(
                            "seed word {word:?} is assigned to topics {existing} and {topic}"
                        )));
                    }
                    None => {}
                }
                by_term.insert(term_index, topic);
                assignments.push(SeedAssignment {
                    term_index,
                    topic,
                    confidence,
                });
            }
        }

        if !missing.is_empty() {
            return Err(TopicError::configuration(format!(
                "seed words not in vocabulary: {}",
                missing.join(", ")
            )));
        }

        Ok(assignments)
    }
}

impl Default for SeedTopics {
    fn default() -> Self {
        Self::default_topics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_terms(["game", "win", "stock", "price", "policy"])
    }

    #[test]
    fn test_resolve_assigns_topics_by_position() {
        let seeds = SeedTopics::from_word_lists(&[&["game", "win"], &["stock", "price"]]);
        let resolved = seeds.resolve(&vocab(), 3, 0.25).unwrap();
        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved[0].term_index, 0);
        assert_eq!(resolved[0].topic, 0);
        assert_eq!(resolved[3].term_index, 3);
        assert_eq!(resolved[3].topic, 1);
        assert!(resolved.iter().all(|s| s.confidence == 0.25));
    }

    #[test]
    fn test_resolve_lists_every_missing_word() {
        let seeds = SeedTopics::from_word_lists(&[&["game", "soccer"], &["stock", "market"]]);
        let err = seeds.resolve(&vocab(), 2, 0.25).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, TopicError::Configuration(_)));
        assert!(msg.contains("soccer") && msg.contains("market"), "{msg}");
    }

    #[test]
    fn test_resolve_rejects_too_many_topics() {
        let seeds = SeedTopics::from_word_lists(&[&["game"], &["stock"], &["policy"]]);
        assert!(seeds.resolve(&vocab(), 2, 0.25).is_err());
    }

    #[test]
    fn test_resolve_rejects_conflicting_word() {
        let seeds = SeedTopics::from_word_lists(&[&["game"], &["game"]]);
        assert!(seeds.resolve(&vocab(), 2, 0.25).is_err());
    }

    #[test]
    fn test_per_topic_confidence_and_bounds() {
        let seeds = SeedTopics::new(vec![SeedTopic {
            words: vec!["game".into()],
            confidence: Some(0.9),
        }]);
        assert_eq!(seeds.resolve(&vocab(), 1, 0.25).unwrap()[0].confidence, 0.9);

        let bad = SeedTopics::new(vec![SeedTopic {
            words: vec!["game".into()],
            confidence: Some(1.5),
        }]);
        assert!(bad.resolve(&vocab(), 1, 0.25).is_err());
    }

    #[test]
    fn test_parse_seed_json() {
        let seeds: SeedTopics =
            serde_json::from_str(r#"[{"words": ["game"]}, {"words": ["stock"], "confidence": 0.5}]"#)
                .unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds.topics()[1].confidence, Some(0.5));
    }
}

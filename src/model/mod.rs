// Guided topic model — seeded LDA training and fixed-topic inference.
//
// `GuidedLda` trains a `TopicModel` with collapsed Gibbs sampling whose
// per-word topic prior is tilted toward analyst seed words. The trained
// model is immutable: it is saved whole, loaded whole, and inference never
// touches its topic-word matrix.

pub mod guided;
pub mod inference;
pub mod seeds;
pub mod snapshot;

use serde::{Deserialize, Serialize};

use crate::vocab::Vocabulary;

pub use guided::{FitOutput, GuidedLda, SweepReport, TrainParams};
pub use inference::TopicDistribution;
pub use seeds::{SeedAssignment, SeedTopic, SeedTopics};

/// Trained state of a guided topic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicModel {
    pub params: TrainParams,
    /// Fingerprint of the vocabulary the training corpus was encoded against.
    pub vocab_fingerprint: String,
    pub vocab_size: usize,
    /// K rows of |V| probabilities; each row sums to 1.
    pub topic_word: Vec<Vec<f64>>,
    /// Per-token log-likelihood after the final sweep.
    pub log_likelihood: f64,
}

impl TopicModel {
    pub fn n_topics(&self) -> usize {
        self.topic_word.len()
    }

    /// Top `n` vocabulary indices per topic with their probabilities,
    /// highest first; equal probabilities keep vocabulary order.
    pub fn top_word_indices(&self, n: usize) -> Vec<Vec<(usize, f64)>> {
        self.topic_word
            .iter()
            .map(|row| {
                let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                ranked.truncate(n);
                ranked
            })
            .collect()
    }

    /// Top `n` terms per topic, resolved through the vocabulary.
    pub fn top_words(&self, vocab: &Vocabulary, n: usize) -> Vec<Vec<(String, f64)>> {
        self.top_word_indices(n)
            .into_iter()
            .map(|topic| {
                topic
                    .into_iter()
                    .filter_map(|(idx, p)| vocab.term(idx).map(|t| (t.to_string(), p)))
                    .collect()
            })
            .collect()
    }
}

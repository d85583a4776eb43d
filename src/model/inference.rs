// Inference — topic distributions for new documents with the topic-word
// matrix held fixed.
//
// Each document runs a short deterministic fixed-point iteration over its
// tokens' topic responsibilities:
//
//   r[i][t] ∝ φ[t][w_i] * (Σ_{j≠i} r[j][t] + alpha)
//
// stopping after INFERENCE_MAX_ITER passes or when the total change drops
// below INFERENCE_TOL. θ is the normalized column sum of r.

use tracing::debug;

use super::TopicModel;
use crate::encode::{EncodedCorpus, EncodedDocument};
use crate::error::TopicError;

pub const INFERENCE_MAX_ITER: usize = 20;
pub const INFERENCE_TOL: f64 = 1e-16;

/// A document's probability distribution over topics.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicDistribution(pub Vec<f64>);

impl TopicDistribution {
    pub fn probabilities(&self) -> &[f64] {
        &self.0
    }

    /// Index of the most probable topic; ties go to the lowest index.
    pub fn dominant_topic(&self) -> usize {
        let mut best = 0;
        for (t, &p) in self.0.iter().enumerate() {
            if p > self.0[best] {
                best = t;
            }
        }
        best
    }
}

impl TopicModel {
    /// Infer topic distributions for every document of a corpus, in order.
    ///
    /// The corpus must have been encoded against the vocabulary this model
    /// was trained with; any other vocabulary is a consistency error.
    pub fn transform(&self, corpus: &EncodedCorpus) -> Result<Vec<TopicDistribution>, TopicError> {
        if corpus.vocab_fingerprint != self.vocab_fingerprint {
            return Err(TopicError::consistency(format!(
                "corpus vocabulary {} does not match model vocabulary {}",
                short(&corpus.vocab_fingerprint),
                short(&self.vocab_fingerprint)
            )));
        }
        if corpus.vocab_size != self.vocab_size {
            return Err(TopicError::consistency(format!(
                "corpus vocabulary has {} terms, model has {}",
                corpus.vocab_size, self.vocab_size
            )));
        }

        let dists = corpus
            .documents
            .iter()
            .map(|doc| self.infer_document(doc))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(documents = dists.len(), "Inferred topic distributions");
        Ok(dists)
    }

    /// Infer one document's topic distribution. The document's indices must
    /// be within the model's vocabulary.
    pub fn infer_document(&self, doc: &EncodedDocument) -> Result<TopicDistribution, TopicError> {
        let k = self.n_topics();
        if let Some(bad) = doc.terms().iter().find(|t| t.index >= self.vocab_size) {
            return Err(TopicError::consistency(format!(
                "term index {} outside model vocabulary of {} terms",
                bad.index + 1,
                self.vocab_size
            )));
        }

        let tokens = doc.tokens();
        if tokens.is_empty() || k == 0 {
            return Ok(TopicDistribution(vec![1.0 / k.max(1) as f64; k]));
        }

        let (resp, passes) = self.responsibilities(&tokens);
        debug!(tokens = tokens.len(), passes, "Inferred document");

        let mut theta = vec![0.0f64; k];
        for row in &resp {
            for (t, &r) in row.iter().enumerate() {
                theta[t] += r;
            }
        }
        let total: f64 = theta.iter().sum();
        theta.iter_mut().for_each(|p| *p /= total);

        Ok(TopicDistribution(theta))
    }

    /// Run the fixed-point iteration for one non-empty token list. Returns
    /// the per-token responsibilities and the number of passes made.
    fn responsibilities(&self, tokens: &[usize]) -> (Vec<Vec<f64>>, usize) {
        let k = self.n_topics();
        let alpha = self.params.alpha;
        let mut resp = vec![vec![0.0f64; k]; tokens.len()];

        let mut passes = 0;
        for _ in 0..INFERENCE_MAX_ITER {
            passes += 1;
            let mut col_sum = vec![0.0f64; k];
            for row in &resp {
                for (t, &r) in row.iter().enumerate() {
                    col_sum[t] += r;
                }
            }

            let mut delta = 0.0;
            let mut next = Vec::with_capacity(tokens.len());
            for (i, &w) in tokens.iter().enumerate() {
                let mut row: Vec<f64> = (0..k)
                    .map(|t| self.topic_word[t][w] * (col_sum[t] - resp[i][t] + alpha))
                    .collect();
                let norm: f64 = row.iter().sum();
                if norm > 0.0 {
                    row.iter_mut().for_each(|r| *r /= norm);
                } else {
                    row.iter_mut().for_each(|r| *r = 1.0 / k as f64);
                }
                delta += row
                    .iter()
                    .zip(&resp[i])
                    .map(|(a, b)| (a - b).abs())
                    .sum::<f64>();
                next.push(row);
            }
            resp = next;
            if delta < INFERENCE_TOL {
                break;
            }
        }
        (resp, passes)
    }
}

fn short(fingerprint: &str) -> &str {
    &fingerprint[..fingerprint.len().min(12)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrainParams;
    use crate::vocab::Vocabulary;

    /// Two topics over [game, win, stock, price]: topic 0 is sports-heavy,
    /// topic 1 business-heavy.
    fn fixed_model(vocab: &Vocabulary) -> TopicModel {
        TopicModel {
            params: TrainParams {
                n_topics: 2,
                ..TrainParams::default()
            },
            vocab_fingerprint: vocab.fingerprint(),
            vocab_size: vocab.len(),
            topic_word: vec![vec![0.45, 0.45, 0.05, 0.05], vec![0.05, 0.05, 0.45, 0.45]],
            log_likelihood: 0.0,
        }
    }

    fn vocab() -> Vocabulary {
        Vocabulary::from_terms(["game", "win", "stock", "price"])
    }

    #[test]
    fn test_dominant_topic_tie_goes_low() {
        assert_eq!(TopicDistribution(vec![0.4, 0.4, 0.2]).dominant_topic(), 0);
        assert_eq!(TopicDistribution(vec![0.2, 0.4, 0.4]).dominant_topic(), 1);
        assert_eq!(TopicDistribution(vec![0.1, 0.2, 0.7]).dominant_topic(), 2);
    }

    #[test]
    fn test_infer_follows_topic_words() {
        let vocab = vocab();
        let model = fixed_model(&vocab);
        let corpus = EncodedCorpus::encode(&["game win game", "stock price"], &vocab).unwrap();
        let dists = model.transform(&corpus).unwrap();
        assert_eq!(dists.len(), 2);
        assert_eq!(dists[0].dominant_topic(), 0);
        assert_eq!(dists[1].dominant_topic(), 1);
        for d in &dists {
            assert!((d.probabilities().iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_infer_is_deterministic() {
        let vocab = vocab();
        let model = fixed_model(&vocab);
        let corpus = EncodedCorpus::encode(&["game stock price win"], &vocab).unwrap();
        assert_eq!(model.transform(&corpus).unwrap(), model.transform(&corpus).unwrap());
    }

    #[test]
    fn test_transform_rejects_other_vocabulary() {
        let vocab = vocab();
        let model = fixed_model(&vocab);
        let other = Vocabulary::from_terms(["win", "game", "stock", "price"]);
        let corpus = EncodedCorpus::encode(&["game"], &other).unwrap();
        let err = model.transform(&corpus).unwrap_err();
        assert!(matches!(err, TopicError::Consistency(_)));
    }

    #[test]
    fn test_single_token_converges_on_second_pass() {
        let model = fixed_model(&vocab());
        let (resp, passes) = model.responsibilities(&[0]);
        assert_eq!(passes, 2);
        assert!((resp[0][0] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_passes_never_exceed_max_iter() {
        let model = fixed_model(&vocab());
        let (_, passes) = model.responsibilities(&[0, 0, 1, 2, 3, 3, 2]);
        assert!(passes <= INFERENCE_MAX_ITER, "{passes} passes");
    }

    #[test]
    fn test_infer_document_rejects_out_of_range_index() {
        let vocab = vocab();
        let model = fixed_model(&vocab);
        let doc = EncodedDocument::from_counts([(7, 1)]);
        assert!(matches!(
            model.infer_document(&doc),
            Err(TopicError::Consistency(_))
        ));
    }
}

// Seeded LDA training by collapsed Gibbs sampling.
//
// The conditional for a token of word w in document d is the usual
//
//   p(z = t) ∝ (n_dt + alpha) * (n_tw + eta) / (n_t + V * eta) * prior_w(t)
//
// where prior_w is uniform for unseeded words and, for a word seeded into
// topic s with confidence c, prior_w(t) = (1 - c) / K + c * [t == s].
// c = 0 leaves the sampler untouched; c = 1 pins the word to its seed topic.
// Seeded tokens also start in their seed topic with probability c.
//
// All randomness comes from one StdRng seeded with `random_state`, and
// documents and tokens are visited in a fixed order, so identical inputs
// give a bit-identical model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::seeds::SeedTopics;
use super::TopicModel;
use crate::encode::EncodedCorpus;
use crate::error::TopicError;
use crate::vocab::Vocabulary;

/// Training hyperparameters. Every value that affects the result is explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    /// Number of topics K.
    pub n_topics: usize,
    /// Gibbs sweeps over every token.
    pub n_iter: usize,
    /// Log-likelihood is reported every `refresh` sweeps (0 disables it).
    pub refresh: usize,
    /// Seed for the sampler's random number generator.
    pub random_state: u64,
    /// Default seed confidence in [0, 1].
    pub seed_confidence: f64,
    /// Document-topic Dirichlet prior.
    pub alpha: f64,
    /// Topic-word Dirichlet prior.
    pub eta: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            n_topics: 5,
            n_iter: 100,
            refresh: 20,
            random_state: 7,
            seed_confidence: 0.25,
            alpha: 0.1,
            eta: 0.01,
        }
    }
}

impl TrainParams {
    pub fn validate(&self) -> Result<(), TopicError> {
        if self.n_topics == 0 {
            return Err(TopicError::configuration("topic count must be at least 1"));
        }
        if self.n_iter == 0 {
            return Err(TopicError::configuration("iteration count must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.seed_confidence) {
            return Err(TopicError::configuration(format!(
                "seed confidence {} is outside [0, 1]",
                self.seed_confidence
            )));
        }
        if !(self.alpha > 0.0 && self.eta > 0.0) {
            return Err(TopicError::configuration("alpha and eta must be positive"));
        }
        Ok(())
    }
}

/// Progress notification sent after every sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepReport {
    /// 1-based sweep number.
    pub sweep: usize,
    pub total: usize,
    /// Present on refresh sweeps and on the final sweep.
    pub log_likelihood: Option<f64>,
}

/// Result of training: the model plus the training corpus's own
/// document-topic distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutput {
    pub model: TopicModel,
    pub doc_topic: Vec<Vec<f64>>,
}

/// Guided LDA trainer.
#[derive(Debug, Clone, Default)]
pub struct GuidedLda {
    params: TrainParams,
}

impl GuidedLda {
    pub fn new(params: TrainParams) -> Self {
        Self { params }
    }

    pub fn fit(
        &self,
        corpus: &EncodedCorpus,
        vocab: &Vocabulary,
        seeds: &SeedTopics,
    ) -> Result<FitOutput, TopicError> {
        self.fit_with_observer(corpus, vocab, seeds, |_| {})
    }

    /// Train, calling `observer` after each sweep.
    ///
    /// Every check (parameters, vocabulary identity, seed words) runs before
    /// the first sweep, so a bad configuration never produces a model.
    pub fn fit_with_observer<F>(
        &self,
        corpus: &EncodedCorpus,
        vocab: &Vocabulary,
        seeds: &SeedTopics,
        mut observer: F,
    ) -> Result<FitOutput, TopicError>
    where
        F: FnMut(&SweepReport),
    {
        let p = &self.params;
        p.validate()?;

        if vocab.is_empty() {
            return Err(TopicError::encoding("cannot train on an empty vocabulary"));
        }
        if corpus.vocab_fingerprint != vocab.fingerprint() || corpus.vocab_size != vocab.len() {
            return Err(TopicError::consistency(
                "training corpus was encoded against a different vocabulary",
            ));
        }
        if corpus.total_tokens() == 0 {
            return Err(TopicError::encoding("training corpus has no tokens"));
        }

        let seed_assignments = seeds.resolve(vocab, p.n_topics, p.seed_confidence)?;

        let k = p.n_topics;
        let v = vocab.len();
        let mut state = SamplerState::new(corpus, k, v);

        // Per-word prior weights; None means uniform.
        let mut prior: Vec<Option<Vec<f64>>> = vec![None; v];
        let mut seed_of: Vec<Option<(usize, f64)>> = vec![None; v];
        for s in &seed_assignments {
            let base = (1.0 - s.confidence) / k as f64;
            let mut weights = vec![base; k];
            weights[s.topic] += s.confidence;
            prior[s.term_index] = Some(weights);
            seed_of[s.term_index] = Some((s.topic, s.confidence));
        }

        info!(
            documents = corpus.len(),
            tokens = corpus.total_tokens(),
            vocab = v,
            topics = k,
            seeds = seed_assignments.len(),
            iterations = p.n_iter,
            "Starting guided LDA training"
        );

        let mut rng = StdRng::seed_from_u64(p.random_state);
        state.initialize(&seed_of, &mut rng);

        let vb = v as f64 * p.eta;
        let mut weights = vec![0.0f64; k];
        let mut log_likelihood = f64::NAN;

        for sweep in 1..=p.n_iter {
            for d in 0..state.docs.len() {
                for pos in 0..state.docs[d].len() {
                    let w = state.docs[d][pos];
                    let old = state.z[d][pos];
                    state.decrement(d, w, old);

                    let mut total = 0.0;
                    for (t, weight) in weights.iter_mut().enumerate() {
                        let mut p_t = (state.ndk[d][t] as f64 + p.alpha)
                            * (state.nkw[t][w] as f64 + p.eta)
                            / (state.nk[t] as f64 + vb);
                        if let Some(pw) = &prior[w] {
                            p_t *= pw[t];
                        }
                        *weight = p_t;
                        total += p_t;
                    }

                    let new = sample_topic(&weights, total, &mut rng);
                    state.z[d][pos] = new;
                    state.increment(d, w, new);
                }
            }

            let report_now = sweep == p.n_iter || (p.refresh > 0 && sweep % p.refresh == 0);
            let ll = if report_now {
                let ll = state.log_likelihood(p.alpha, p.eta);
                info!(sweep, total = p.n_iter, log_likelihood = ll, "Gibbs sweep");
                log_likelihood = ll;
                Some(ll)
            } else {
                debug!(sweep, "Gibbs sweep");
                None
            };

            observer(&SweepReport {
                sweep,
                total: p.n_iter,
                log_likelihood: ll,
            });
        }

        let model = TopicModel {
            params: p.clone(),
            vocab_fingerprint: vocab.fingerprint(),
            vocab_size: v,
            topic_word: state.phi(p.eta),
            log_likelihood,
        };
        let doc_topic = state.theta(p.alpha);

        Ok(FitOutput { model, doc_topic })
    }
}

/// Draw a topic proportionally to `weights` (which sum to `total`).
fn sample_topic(weights: &[f64], total: f64, rng: &mut StdRng) -> usize {
    if !(total > 0.0) {
        return rng.random_range(0..weights.len());
    }
    let mut u = rng.random::<f64>() * total;
    let mut last_positive = 0;
    for (t, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            last_positive = t;
        }
        u -= w;
        if u < 0.0 {
            return t;
        }
    }
    // Rounding left u marginally above zero.
    last_positive
}

/// Count tables for collapsed Gibbs sampling.
struct SamplerState {
    /// Token word indices per document.
    docs: Vec<Vec<usize>>,
    /// Topic assignment per token.
    z: Vec<Vec<usize>>,
    /// [doc][topic] token counts.
    ndk: Vec<Vec<usize>>,
    /// [topic][word] token counts.
    nkw: Vec<Vec<usize>>,
    /// [topic] token counts.
    nk: Vec<usize>,
    k: usize,
}

impl SamplerState {
    fn new(corpus: &EncodedCorpus, k: usize, v: usize) -> Self {
        let docs: Vec<Vec<usize>> = corpus.documents.iter().map(|d| d.tokens()).collect();
        let z = docs.iter().map(|d| vec![0; d.len()]).collect();
        Self {
            ndk: vec![vec![0; k]; docs.len()],
            nkw: vec![vec![0; v]; k],
            nk: vec![0; k],
            docs,
            z,
            k,
        }
    }

    /// Seeded tokens start in their seed topic with probability equal to
    /// their confidence; everything else starts in a uniform random topic.
    fn initialize(&mut self, seed_of: &[Option<(usize, f64)>], rng: &mut StdRng) {
        for d in 0..self.docs.len() {
            for pos in 0..self.docs[d].len() {
                let w = self.docs[d][pos];
                let topic = match seed_of[w] {
                    Some((seed_topic, confidence)) if rng.random::<f64>() < confidence => {
                        seed_topic
                    }
                    _ => rng.random_range(0..self.k),
                };
                self.z[d][pos] = topic;
                self.increment(d, w, topic);
            }
        }
    }

    fn increment(&mut self, d: usize, w: usize, t: usize) {
        self.ndk[d][t] += 1;
        self.nkw[t][w] += 1;
        self.nk[t] += 1;
    }

    fn decrement(&mut self, d: usize, w: usize, t: usize) {
        self.ndk[d][t] -= 1;
        self.nkw[t][w] -= 1;
        self.nk[t] -= 1;
    }

    /// φ[t][w] = (n_tw + eta) / (n_t + V * eta)
    fn phi(&self, eta: f64) -> Vec<Vec<f64>> {
        self.nkw
            .iter()
            .zip(&self.nk)
            .map(|(row, &n_t)| {
                let denom = n_t as f64 + row.len() as f64 * eta;
                row.iter().map(|&c| (c as f64 + eta) / denom).collect()
            })
            .collect()
    }

    /// θ[d][t] = (n_dt + alpha) / (N_d + K * alpha)
    fn theta(&self, alpha: f64) -> Vec<Vec<f64>> {
        self.ndk
            .iter()
            .zip(&self.docs)
            .map(|(row, doc)| {
                let denom = doc.len() as f64 + self.k as f64 * alpha;
                row.iter().map(|&c| (c as f64 + alpha) / denom).collect()
            })
            .collect()
    }

    /// Mean over tokens of ln Σ_t θ[d][t] φ[t][w].
    fn log_likelihood(&self, alpha: f64, eta: f64) -> f64 {
        let phi = self.phi(eta);
        let theta = self.theta(alpha);
        let mut total = 0.0;
        let mut tokens = 0usize;
        for (d, doc) in self.docs.iter().enumerate() {
            for &w in doc {
                let p: f64 = (0..self.k).map(|t| theta[d][t] * phi[t][w]).sum();
                total += p.ln();
                tokens += 1;
            }
        }
        if tokens == 0 {
            0.0
        } else {
            total / tokens as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> (Vocabulary, EncodedCorpus) {
        let vocab = Vocabulary::from_terms(["game", "win", "stock", "price", "team", "market"]);
        let docs = vec![
            "game win team game",
            "stock price market",
            "team win game",
            "market stock stock price",
        ];
        let corpus = EncodedCorpus::encode(&docs, &vocab).unwrap();
        (vocab, corpus)
    }

    fn params() -> TrainParams {
        TrainParams {
            n_topics: 2,
            n_iter: 30,
            refresh: 10,
            ..TrainParams::default()
        }
    }

    #[test]
    fn test_rows_are_distributions() {
        let (vocab, corpus) = toy();
        let seeds = SeedTopics::from_word_lists(&[&["game"], &["stock"]]);
        let out = GuidedLda::new(params()).fit(&corpus, &vocab, &seeds).unwrap();

        assert_eq!(out.model.n_topics(), 2);
        for row in &out.model.topic_word {
            assert_eq!(row.len(), vocab.len());
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        assert_eq!(out.doc_topic.len(), 4);
        for row in &out.doc_topic {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        assert!(out.model.log_likelihood.is_finite());
    }

    #[test]
    fn test_observer_sees_every_sweep_and_refreshes() {
        let (vocab, corpus) = toy();
        let seeds = SeedTopics::from_word_lists(&[&["game"]]);
        let mut sweeps = 0;
        let mut refreshes = 0;
        GuidedLda::new(params())
            .fit_with_observer(&corpus, &vocab, &seeds, |r| {
                sweeps += 1;
                if r.log_likelihood.is_some() {
                    refreshes += 1;
                }
            })
            .unwrap();
        assert_eq!(sweeps, 30);
        assert_eq!(refreshes, 3);
    }

    #[test]
    fn test_missing_seed_word_fails_before_sampling() {
        let (vocab, corpus) = toy();
        let seeds = SeedTopics::from_word_lists(&[&["soccer"]]);
        let mut sweeps = 0;
        let err = GuidedLda::new(params())
            .fit_with_observer(&corpus, &vocab, &seeds, |_| sweeps += 1)
            .unwrap_err();
        assert!(matches!(err, TopicError::Configuration(_)));
        assert_eq!(sweeps, 0);
    }

    #[test]
    fn test_corpus_from_other_vocabulary_rejected() {
        let (vocab, corpus) = toy();
        let other = Vocabulary::from_terms(["win", "game", "stock", "price", "team", "market"]);
        let seeds = SeedTopics::new(vec![]);
        let err = GuidedLda::new(params()).fit(&corpus, &other, &seeds).unwrap_err();
        assert!(matches!(err, TopicError::Consistency(_)));
        assert!(GuidedLda::new(params()).fit(&corpus, &vocab, &seeds).is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let (vocab, corpus) = toy();
        let seeds = SeedTopics::new(vec![]);
        for bad in [
            TrainParams { n_topics: 0, ..params() },
            TrainParams { n_iter: 0, ..params() },
            TrainParams { seed_confidence: -0.1, ..params() },
            TrainParams { alpha: 0.0, ..params() },
        ] {
            let err = GuidedLda::new(bad).fit(&corpus, &vocab, &seeds).unwrap_err();
            assert!(matches!(err, TopicError::Configuration(_)));
        }
    }

    #[test]
    fn test_full_confidence_pins_seed_words() {
        let (vocab, corpus) = toy();
        let seeds = SeedTopics::from_word_lists(&[&["game", "win"], &["stock", "price"]]);
        let p = TrainParams {
            seed_confidence: 1.0,
            ..params()
        };
        let out = GuidedLda::new(p).fit(&corpus, &vocab, &seeds).unwrap();
        let phi = &out.model.topic_word;
        let game = vocab.index_of("game").unwrap();
        let stock = vocab.index_of("stock").unwrap();
        assert!(phi[0][game] > phi[1][game]);
        assert!(phi[1][stock] > phi[0][stock]);
    }

    #[test]
    fn test_sample_topic_respects_zero_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(sample_topic(&[0.0, 2.0, 0.0], 2.0, &mut rng), 1);
        }
    }
}

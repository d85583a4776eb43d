// Train mode — cleaned corpus (or an LDA-C file plus its vocabulary) in,
// persisted vocabulary + LDA-C + model out.
//
// Everything that can fail on configuration (labels, seeds, parameters,
// vocabulary identity) fails inside `train_encoded`, before any file is
// written. Files are persisted only after a model exists.

use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Config;
use crate::corpus::read_documents;
use crate::encode::EncodedCorpus;
use crate::error::TopicError;
use crate::labels::TopicLabels;
use crate::model::{FitOutput, GuidedLda, SeedTopics, SweepReport, TrainParams};
use crate::output::terminal;
use crate::vocab::Vocabulary;

/// Number of top words shown per topic after training.
pub const DEFAULT_TOP_WORDS: usize = 10;

/// Everything training produced, kept together for persisting and display.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub vocab: Vocabulary,
    pub corpus: EncodedCorpus,
    pub fit: FitOutput,
}

/// Encode `documents` against `vocab` and train a guided model.
///
/// The label table is checked against the topic count first, so a mismatch
/// never reaches the sampler.
pub fn train_corpus<S, F>(
    documents: &[S],
    vocab: Vocabulary,
    seeds: &SeedTopics,
    labels: &TopicLabels,
    params: TrainParams,
    observer: F,
) -> Result<TrainOutcome, TopicError>
where
    S: AsRef<str>,
    F: FnMut(&SweepReport),
{
    labels.validate_for(params.n_topics)?;
    let corpus = EncodedCorpus::encode(documents, &vocab)?;
    train_encoded(corpus, vocab, seeds, labels, params, observer)
}

/// Train a guided model on an already encoded corpus.
pub fn train_encoded<F>(
    corpus: EncodedCorpus,
    vocab: Vocabulary,
    seeds: &SeedTopics,
    labels: &TopicLabels,
    params: TrainParams,
    observer: F,
) -> Result<TrainOutcome, TopicError>
where
    F: FnMut(&SweepReport),
{
    labels.validate_for(params.n_topics)?;
    let fit = GuidedLda::new(params).fit_with_observer(&corpus, &vocab, seeds, observer)?;
    Ok(TrainOutcome { vocab, corpus, fit })
}

/// Write the vocabulary, the encoded training corpus and the model snapshot.
pub fn persist(config: &Config, outcome: &TrainOutcome) -> Result<()> {
    outcome.vocab.save(&config.vocab_path())?;
    outcome.corpus.write_ldac(&config.corpus_ldac_path())?;
    outcome.fit.model.save(&config.model_path())?;
    Ok(())
}

/// Train from a cleaned corpus file.
///
/// With `vocab_path`, the given vocabulary is used as-is; otherwise one is
/// built from the corpus.
pub fn run(
    config: &Config,
    corpus_path: &Path,
    vocab_path: Option<&Path>,
    params: TrainParams,
    top_n: usize,
) -> Result<TrainOutcome> {
    let documents = read_documents(corpus_path)?;
    info!(
        documents = documents.len(),
        path = %corpus_path.display(),
        "Loaded training corpus"
    );

    let vocab = match vocab_path {
        Some(path) => Vocabulary::load(path)?,
        None => config.vocabulary_builder()?.build(&documents),
    };
    let seeds = config.seed_topics()?;
    config.labels.validate_for(params.n_topics)?;
    let corpus = EncodedCorpus::encode(&documents, &vocab)?;

    train_and_report(config, corpus, vocab, &seeds, params, top_n)
}

/// Train from an LDA-C file and the vocabulary it was encoded against.
pub fn run_ldac(
    config: &Config,
    ldac_path: &Path,
    vocab_path: &Path,
    params: TrainParams,
    top_n: usize,
) -> Result<TrainOutcome> {
    let vocab = Vocabulary::load(vocab_path)?;
    let corpus = EncodedCorpus::read_ldac(ldac_path, &vocab)?;
    info!(
        documents = corpus.len(),
        path = %ldac_path.display(),
        "Loaded LDA-C corpus"
    );
    let seeds = config.seed_topics()?;

    train_and_report(config, corpus, vocab, &seeds, params, top_n)
}

/// Shared tail of train and pull: train with a progress bar, persist, show
/// the top words.
pub(crate) fn train_and_report(
    config: &Config,
    corpus: EncodedCorpus,
    vocab: Vocabulary,
    seeds: &SeedTopics,
    params: TrainParams,
    top_n: usize,
) -> Result<TrainOutcome> {
    println!(
        "Training {} topics over {} documents ({} terms, {} sweeps)...",
        params.n_topics,
        corpus.len(),
        vocab.len(),
        params.n_iter
    );

    let pb = ProgressBar::new(params.n_iter as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Sampling [{bar:30}] {pos}/{len} ({eta}) {msg}")
            .unwrap(),
    );

    let result = train_encoded(corpus, vocab, seeds, &config.labels, params, |report| {
        pb.inc(1);
        if let Some(ll) = report.log_likelihood {
            pb.set_message(format!("ll/token {ll:.4}"));
        }
    });
    pb.finish_and_clear();
    let outcome = result?;

    persist(config, &outcome)?;

    let model = &outcome.fit.model;
    terminal::display_train_summary(model, &outcome.corpus, &config.model_path());
    terminal::display_topics(&config.labels, &model.top_words(&outcome.vocab, top_n))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TrainParams {
        TrainParams {
            n_topics: 2,
            n_iter: 20,
            refresh: 10,
            ..TrainParams::default()
        }
    }

    #[test]
    fn test_label_mismatch_fails_before_sampling() {
        let vocab = Vocabulary::from_terms(["game", "stock"]);
        let seeds = SeedTopics::from_word_lists(&[&["game"], &["stock"]]);
        let mut sweeps = 0;
        let err = train_corpus(
            &["game game", "stock stock"],
            vocab,
            &seeds,
            &TopicLabels::default(),
            params(),
            |_| sweeps += 1,
        )
        .unwrap_err();
        assert!(matches!(err, TopicError::Configuration(_)));
        assert_eq!(sweeps, 0);
    }

    #[test]
    fn test_run_persists_only_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            labels: TopicLabels::new(["Sports", "Business"]),
            ..Config::with_home(dir.path())
        };
        let corpus_path = dir.path().join("train.txt");
        std::fs::write(&corpus_path, "game win team\nstock price market\n").unwrap();

        // Default seed lists have four topics; a two-topic model rejects them.
        assert!(run(&config, &corpus_path, None, params(), 3).is_err());
        assert!(!config.model_path().exists());
        assert!(!config.vocab_path().exists());

        let seeds_path = dir.path().join("seeds.json");
        std::fs::write(&seeds_path, r#"[{"words":["game"]},{"words":["stock"]}]"#).unwrap();
        let config = Config {
            seeds_path: Some(seeds_path),
            ..config
        };
        let outcome = run(&config, &corpus_path, None, params(), 3).unwrap();
        assert!(config.model_path().exists());
        assert_eq!(
            Vocabulary::load(&config.vocab_path()).unwrap(),
            outcome.vocab
        );
        assert_eq!(
            std::fs::read_to_string(config.corpus_ldac_path()).unwrap().lines().count(),
            2
        );
    }

    #[test]
    fn test_run_ldac_trains_from_encoded_file() {
        let dir = tempfile::tempdir().unwrap();
        let seeds_path = dir.path().join("seeds.json");
        std::fs::write(&seeds_path, r#"[{"words":["game"]},{"words":["stock"]}]"#).unwrap();
        let config = Config {
            labels: TopicLabels::new(["Sports", "Business"]),
            seeds_path: Some(seeds_path),
            ..Config::with_home(dir.path().join("home"))
        };

        let vocab_path = dir.path().join("train.tokens");
        std::fs::write(&vocab_path, "game\nwin\nstock\nprice\n").unwrap();
        let ldac_path = dir.path().join("train.ldac");
        std::fs::write(&ldac_path, "2 1:2 2:1\n2 3:2 4:1\n1 2:3\n").unwrap();

        let outcome = run_ldac(&config, &ldac_path, &vocab_path, params(), 3).unwrap();
        assert_eq!(outcome.corpus.len(), 3);
        assert_eq!(outcome.fit.model.vocab_size, 4);
        assert_eq!(
            std::fs::read_to_string(config.corpus_ldac_path()).unwrap(),
            std::fs::read_to_string(&ldac_path).unwrap()
        );
        assert_eq!(
            Vocabulary::load(&config.vocab_path()).unwrap().index_of("price"),
            Some(3)
        );
    }

    #[test]
    fn test_run_ldac_rejects_index_past_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            labels: TopicLabels::new(["Sports", "Business"]),
            ..Config::with_home(dir.path().join("home"))
        };
        let vocab_path = dir.path().join("train.tokens");
        std::fs::write(&vocab_path, "game\nstock\n").unwrap();
        let ldac_path = dir.path().join("train.ldac");
        std::fs::write(&ldac_path, "1 1:1\n1 3:1\n").unwrap();

        let err = run_ldac(&config, &ldac_path, &vocab_path, params(), 3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TopicError>(),
            Some(TopicError::Encoding(_))
        ));
        assert!(!config.model_path().exists());
    }
}

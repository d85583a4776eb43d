// Test modes — label posts with the dominant topic of a stored model.
//
// Online mode fetches the latest timeline posts first; offline mode reads a
// raw feed file already on disk. Both then clean, encode against the stored
// vocabulary and infer. The model and vocabulary are loaded and checked
// before anything is fetched or written.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::corpus::{clean_posts, write_documents};
use crate::encode::EncodedCorpus;
use crate::error::TopicError;
use crate::feed::raw::{read_raw_posts, write_raw_posts};
use crate::feed::{FeedSource, RawPost};
use crate::labels::TopicLabels;
use crate::model::{TopicDistribution, TopicModel};
use crate::output::terminal;
use crate::vocab::Vocabulary;

/// Number of timeline posts fetched in online mode.
pub const DEFAULT_ONLINE_COUNT: usize = 20;

/// One labeled post.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub post: RawPost,
    pub topic: usize,
    pub label: String,
    pub distribution: TopicDistribution,
    /// The post shared no terms with the vocabulary; its label comes from
    /// the placeholder encoding and carries no signal.
    pub no_overlap: bool,
}

/// Label each post by its cleaned document. `posts[i]` and `documents[i]`
/// must be the same post.
pub fn classify<S: AsRef<str>>(
    model: &TopicModel,
    vocab: &Vocabulary,
    labels: &TopicLabels,
    posts: &[RawPost],
    documents: &[S],
) -> Result<(EncodedCorpus, Vec<Classification>), TopicError> {
    if posts.len() != documents.len() {
        return Err(TopicError::consistency(format!(
            "{} posts but {} cleaned documents",
            posts.len(),
            documents.len()
        )));
    }
    model.check_compatible(vocab, labels)?;

    let corpus = EncodedCorpus::encode(documents, vocab)?;
    let distributions = model.transform(&corpus)?;

    let mut results = Vec::with_capacity(posts.len());
    for ((post, doc), distribution) in posts.iter().zip(&corpus.documents).zip(distributions) {
        let label = labels.dominant_label(&distribution)?.to_string();
        results.push(Classification {
            post: post.clone(),
            topic: distribution.dominant_topic(),
            label,
            distribution,
            no_overlap: doc.is_placeholder(),
        });
    }
    Ok((corpus, results))
}

/// Stored vocabulary and model, checked against each other and the labels.
#[derive(Debug, Clone)]
pub struct StoredModel {
    pub vocab: Vocabulary,
    pub model: TopicModel,
}

impl StoredModel {
    pub fn load(config: &Config) -> Result<Self> {
        let vocab = Vocabulary::load(&config.vocab_path())?;
        let model =
            TopicModel::load_for_inference(&config.model_path(), &vocab, &config.labels)?;
        Ok(Self { vocab, model })
    }
}

fn classify_and_report(
    config: &Config,
    stored: &StoredModel,
    posts: &[RawPost],
) -> Result<Vec<Classification>> {
    let documents = clean_posts(posts, &config.stop_words()?);
    let (corpus, results) = classify(
        &stored.model,
        &stored.vocab,
        &config.labels,
        posts,
        &documents,
    )?;

    write_documents(&config.feed_cleaned_path(), &documents)?;
    corpus.write_ldac(&config.feed_ldac_path())?;

    let no_overlap = results.iter().filter(|r| r.no_overlap).count();
    info!(posts = results.len(), no_overlap, "Classified posts");
    terminal::display_classifications(&results);
    Ok(results)
}

/// Offline mode: re-clean a raw feed file (`id<TAB>post` per line) and
/// label every post in it.
pub fn run_offline(config: &Config, raw_path: &Path) -> Result<Vec<Classification>> {
    let stored = StoredModel::load(config)?;
    println!("Cleaning up the input feed file {}", raw_path.display());
    let posts = read_raw_posts(raw_path)?;
    classify_and_report(config, &stored, &posts)
}

/// Online mode: fetch the latest `count` posts, save them as the raw feed
/// file, and label them with an already loaded model.
pub async fn run_online(
    config: &Config,
    stored: &StoredModel,
    feed: &dyn FeedSource,
    count: usize,
) -> Result<Vec<Classification>> {
    println!("Getting {count} latest posts from Bluesky");
    let posts = feed.latest_posts(count).await?;
    write_raw_posts(&config.feed_raw_path(), &posts)?;
    println!("Extracting topics for these posts");
    classify_and_report(config, stored, &posts)
}

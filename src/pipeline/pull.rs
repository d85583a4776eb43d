// Pull mode — grow the hashtag corpus from Bluesky search, then retrain.
//
// Post search is throttled, so hashtag queries go through a fixed-delay
// rate limiter. Cleaned posts are appended to the hashtag dump; the stored
// vocabulary (when there is one) is extended with the dump's new terms so
// existing indices keep their meaning, and a fresh model is trained on the
// whole dump.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::train::{train_and_report, TrainOutcome};
use crate::config::Config;
use crate::corpus::{append_documents, clean_posts, read_documents};
use crate::encode::EncodedCorpus;
use crate::error::TopicError;
use crate::feed::throttle::SearchThrottle;
use crate::feed::{FeedSource, RawPost};
use crate::model::TrainParams;
use crate::vocab::Vocabulary;

pub const DEFAULT_HASHTAGS: [&str; 4] = ["yoga", "fitness", "gym", "crossfit"];

/// Posts requested per hashtag.
pub const DEFAULT_POSTS_PER_TAG: usize = 500;

/// Fetch up to `per_tag` posts for each hashtag, one throttled search per
/// tag. A tag whose search fails is logged and skipped.
pub async fn collect_hashtag_posts(
    feed: &dyn FeedSource,
    tags: &[String],
    per_tag: usize,
    throttle: &mut SearchThrottle,
) -> Result<Vec<RawPost>> {
    let pb = ProgressBar::new(tags.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Hashtags [{bar:30}] {pos}/{len} {msg}")
            .unwrap(),
    );

    let mut posts = Vec::new();
    for tag in tags {
        pb.set_message(format!("#{tag}"));
        throttle.wait_turn(tag).await;
        match feed.posts_for_hashtag(tag, per_tag).await {
            Ok(batch) => {
                info!(tag = tag.as_str(), count = batch.len(), "Fetched hashtag posts");
                posts.extend(batch);
            }
            Err(e) => warn!(tag = tag.as_str(), error = %e, "Hashtag search failed, skipping"),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(posts)
}

/// Pull posts for `tags`, append them to the hashtag dump and retrain.
pub async fn run(
    config: &Config,
    feed: &dyn FeedSource,
    tags: &[String],
    per_tag: usize,
    params: TrainParams,
    top_n: usize,
) -> Result<TrainOutcome> {
    // Cheap configuration checks before spending minutes on rate-limited calls.
    params.validate()?;
    config.labels.validate_for(params.n_topics)?;
    let seeds = config.seed_topics()?;
    if seeds.len() > params.n_topics {
        return Err(TopicError::configuration(format!(
            "{} seed topics given for a {}-topic model",
            seeds.len(),
            params.n_topics
        ))
        .into());
    }

    println!("Pulling Bluesky posts for: {}", format_tags(tags));
    let mut throttle = SearchThrottle::new(config.feed_delay);
    let posts = collect_hashtag_posts(feed, tags, per_tag, &mut throttle).await?;

    let dump_path = config.hashtag_dump_path();
    let documents = clean_posts(&posts, &config.stop_words()?);
    append_documents(&dump_path, &documents)?;
    println!(
        "Appended {} posts to {}",
        documents.len(),
        dump_path.display()
    );

    let all_documents = read_documents(&dump_path)?;
    let vocab_path = config.vocab_path();
    let base = if vocab_path.exists() {
        Vocabulary::load(&vocab_path)?
    } else {
        Vocabulary::default()
    };
    let vocab = config.vocabulary_builder()?.extend(base, &all_documents);

    let corpus = EncodedCorpus::encode(&all_documents, &vocab)?;
    train_and_report(config, corpus, vocab, &seeds, params, top_n)
}

fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t.trim_start_matches('#')))
        .collect::<Vec<_>>()
        .join(", ")
}

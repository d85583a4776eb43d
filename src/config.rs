use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::error::TopicError;
use crate::labels::TopicLabels;
use crate::model::SeedTopics;
use crate::text::{AlphabeticLexicon, Lexicon, StopWords, WordListLexicon};
use crate::vocab::VocabularyBuilder;

/// Default seconds between consecutive feed calls.
pub const DEFAULT_FEED_DELAY_SECS: u64 = 15;

/// Default model name (the snapshot file stem).
pub const DEFAULT_MODEL_NAME: &str = "guided_lda";

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. The .env file is loaded at startup via
/// dotenvy. The same value is handed to every stage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for vocabulary, corpus, model and feed files.
    pub home: PathBuf,
    pub model_name: String,
    /// Optional word list used as the lexicon; the alphabetic check otherwise.
    pub lexicon_path: Option<PathBuf>,
    /// Optional JSON seed-topic file; the built-in lists otherwise.
    pub seeds_path: Option<PathBuf>,
    pub labels: TopicLabels,
    pub feed_delay: Duration,
    pub bluesky_handle: String,
    pub bluesky_app_password: String,
    /// Server used to open the session and read feeds.
    pub pds_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home: default_home(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            lexicon_path: None,
            seeds_path: None,
            labels: TopicLabels::default(),
            feed_delay: Duration::from_secs(DEFAULT_FEED_DELAY_SECS),
            bluesky_handle: String::new(),
            bluesky_app_password: String::new(),
            pds_url: crate::feed::client::DEFAULT_PDS_URL.to_string(),
        }
    }
}

/// `<data dir>/seedling`, or `./seedling` when the platform has no data dir.
pub fn default_home() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seedling")
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing here is required; credentials are checked by the modes that
    /// go to the network.
    pub fn load() -> Result<Self> {
        let labels = match env::var("SEEDLING_LABELS") {
            Ok(list) if !list.trim().is_empty() => TopicLabels::parse_list(&list)?,
            _ => TopicLabels::default(),
        };

        let feed_delay = match env::var("SEEDLING_FEED_DELAY_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    TopicError::configuration(format!(
                        "SEEDLING_FEED_DELAY_SECS must be a whole number of seconds, got {raw:?}"
                    ))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_FEED_DELAY_SECS),
        };

        Ok(Self {
            home: env::var("SEEDLING_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_home()),
            model_name: env::var("SEEDLING_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            lexicon_path: env::var("SEEDLING_LEXICON").ok().map(PathBuf::from),
            seeds_path: env::var("SEEDLING_SEEDS").ok().map(PathBuf::from),
            labels,
            feed_delay,
            bluesky_handle: env::var("BLUESKY_HANDLE").unwrap_or_default(),
            bluesky_app_password: env::var("BLUESKY_APP_PASSWORD").unwrap_or_default(),
            pds_url: env::var("BLUESKY_PDS_URL")
                .unwrap_or_else(|_| crate::feed::client::DEFAULT_PDS_URL.to_string()),
        })
    }

    /// A config rooted at `home` with every other setting at its default.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Self::default()
        }
    }

    /// Check that Bluesky credentials are configured.
    /// Call this before any network call.
    pub fn require_credentials(&self) -> Result<(), TopicError> {
        if self.bluesky_handle.is_empty() {
            return Err(TopicError::configuration(
                "BLUESKY_HANDLE not set. Add it to your .env file.",
            ));
        }
        if self.bluesky_app_password.is_empty() {
            return Err(TopicError::configuration(
                "BLUESKY_APP_PASSWORD not set. Create an app password in Bluesky settings \
                 and add it to your .env file.",
            ));
        }
        Ok(())
    }

    pub fn model_path(&self) -> PathBuf {
        self.home.join(format!("{}.json", self.model_name))
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.home.join("vocab.tokens")
    }

    pub fn corpus_ldac_path(&self) -> PathBuf {
        self.home.join("corpus.ldac")
    }

    pub fn feed_raw_path(&self) -> PathBuf {
        self.home.join("feed_raw.txt")
    }

    pub fn feed_cleaned_path(&self) -> PathBuf {
        self.home.join("feed_cleaned.txt")
    }

    pub fn feed_ldac_path(&self) -> PathBuf {
        self.home.join("feed.ldac")
    }

    pub fn hashtag_dump_path(&self) -> PathBuf {
        self.home.join("hashtag_dump.txt")
    }

    /// The configured lexicon predicate.
    pub fn lexicon(&self) -> Result<Box<dyn Lexicon>> {
        Ok(match &self.lexicon_path {
            Some(path) => Box::new(WordListLexicon::load(path)?),
            None => Box::new(AlphabeticLexicon),
        })
    }

    /// English stopwords minus every seed word, so a seed word on the
    /// stopword list still reaches the vocabulary.
    pub fn stop_words(&self) -> Result<StopWords> {
        let seeds = self.seed_topics()?;
        Ok(StopWords::english().without(seeds.topics().iter().flat_map(|t| t.words.iter())))
    }

    pub fn vocabulary_builder(&self) -> Result<VocabularyBuilder> {
        Ok(VocabularyBuilder::new(self.lexicon()?, self.stop_words()?))
    }

    /// The configured seed topics.
    pub fn seed_topics(&self) -> Result<SeedTopics> {
        match &self.seeds_path {
            Some(path) => SeedTopics::load(path),
            None => Ok(SeedTopics::default_topics()),
        }
    }
}

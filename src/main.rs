use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use seedling::config::Config;
use seedling::corpus::read_documents;
use seedling::encode::EncodedCorpus;
use seedling::feed::BlueskyFeed;
use seedling::model::TrainParams;
use seedling::pipeline::{classify, pull, train};
use seedling::vocab::Vocabulary;

/// Seedling: seed-guided topic labeling for Bluesky posts.
///
/// Trains a guided LDA model whose topics lean toward analyst seed words,
/// then labels posts with their dominant topic.
#[derive(Parser)]
#[command(name = "seedling", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a cleaned corpus (one document per line), or from
    /// an LDA-C file and its vocabulary
    #[command(alias = "Train")]
    Train {
        /// Cleaned corpus file
        #[arg(long, required_unless_present = "ldac", conflicts_with = "ldac")]
        corpus: Option<PathBuf>,

        /// LDA-C corpus file, encoded against --vocab
        #[arg(long, requires = "vocab")]
        ldac: Option<PathBuf>,

        /// Vocabulary file (one term per line); built from the corpus if omitted
        #[arg(long)]
        vocab: Option<PathBuf>,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Pull hashtag posts from Bluesky, add them to the corpus and retrain
    #[command(alias = "Pull")]
    Pull {
        /// Hashtags to search (default: yoga fitness gym crossfit)
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        tags: Vec<String>,

        /// Posts to request per hashtag
        #[arg(long, default_value_t = pull::DEFAULT_POSTS_PER_TAG)]
        per_tag: usize,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Fetch the latest timeline posts and label them
    #[command(alias = "TestOnline")]
    TestOnline {
        /// Number of posts to fetch
        #[arg(long, default_value_t = classify::DEFAULT_ONLINE_COUNT)]
        count: usize,
    },

    /// Label the posts of a raw feed file (`id<TAB>post` per line)
    #[command(alias = "TestOffline")]
    TestOffline {
        /// Raw feed file (default: the last fetched feed in SEEDLING_HOME)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Encode a cleaned-posts file to LDA-C against the stored vocabulary
    Encode {
        /// Cleaned posts file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: the input path with an .ldac extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the stored model and whether the vocabulary still matches it
    Status,
}

/// Training hyperparameters shared by train and pull.
#[derive(Args)]
struct TrainingArgs {
    /// Number of topics (must equal the number of labels)
    #[arg(long, default_value = "5")]
    topics: usize,

    /// Gibbs sampling sweeps
    #[arg(long, default_value = "100")]
    iterations: usize,

    /// Report log-likelihood every N sweeps
    #[arg(long, default_value = "20")]
    refresh: usize,

    /// Random seed for the sampler
    #[arg(long, default_value = "7")]
    random_state: u64,

    /// Seed confidence in [0, 1]
    #[arg(long, default_value = "0.25")]
    confidence: f64,

    /// Top words shown per topic
    #[arg(long, default_value_t = train::DEFAULT_TOP_WORDS)]
    top_words: usize,
}

impl TrainingArgs {
    fn params(&self) -> TrainParams {
        TrainParams {
            n_topics: self.topics,
            n_iter: self.iterations,
            refresh: self.refresh,
            random_state: self.random_state,
            seed_confidence: self.confidence,
            ..TrainParams::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("seedling=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Train {
            corpus,
            ldac,
            vocab,
            training,
        } => match (ldac, vocab, corpus) {
            (Some(ldac), Some(vocab), _) => {
                info!(ldac = %ldac.display(), vocab = %vocab.display(), "Training model");
                train::run_ldac(
                    &config,
                    &ldac,
                    &vocab,
                    training.params(),
                    training.top_words,
                )?;
            }
            (_, vocab, Some(corpus)) => {
                info!(corpus = %corpus.display(), "Training model");
                train::run(
                    &config,
                    &corpus,
                    vocab.as_deref(),
                    training.params(),
                    training.top_words,
                )?;
            }
            _ => anyhow::bail!("train needs --corpus, or --ldac with --vocab"),
        },

        Commands::Pull {
            tags,
            per_tag,
            training,
        } => {
            let tags = if tags.is_empty() {
                pull::DEFAULT_HASHTAGS.iter().map(|t| t.to_string()).collect()
            } else {
                tags
            };
            let feed = BlueskyFeed::connect(&config).await?;
            pull::run(
                &config,
                &feed,
                &tags,
                per_tag,
                training.params(),
                training.top_words,
            )
            .await?;
        }

        Commands::TestOnline { count } => {
            let stored = classify::StoredModel::load(&config)?;
            let feed = BlueskyFeed::connect(&config).await?;
            classify::run_online(&config, &stored, &feed, count).await?;
        }

        Commands::TestOffline { input } => {
            let raw_path = input.unwrap_or_else(|| config.feed_raw_path());
            classify::run_offline(&config, &raw_path)?;
        }

        Commands::Encode { input, output } => {
            let vocab = Vocabulary::load(&config.vocab_path())?;
            let documents = read_documents(&input)?;
            let corpus = EncodedCorpus::encode(&documents, &vocab)?;
            let path = output.unwrap_or_else(|| input.with_extension("ldac"));
            corpus.write_ldac(&path)?;
            println!(
                "Encoded {} documents to {}",
                corpus.len(),
                path.display()
            );
        }

        Commands::Status => {
            seedling::status::show(&config)?;
        }
    }

    Ok(())
}

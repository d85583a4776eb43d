// System status display — stored model, vocabulary and feed files.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::model::TopicModel;
use crate::output::truncate_chars;
use crate::vocab::Vocabulary;

/// Whether the vocabulary on disk is the one the model was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyState {
    Missing,
    Matches,
    Stale,
}

/// Compare the stored vocabulary against a model's fingerprint.
pub fn vocabulary_state(model: &TopicModel, vocab: Option<&Vocabulary>) -> VocabularyState {
    match vocab {
        None => VocabularyState::Missing,
        Some(v) if v.fingerprint() == model.vocab_fingerprint && v.len() == model.vocab_size => {
            VocabularyState::Matches
        }
        Some(_) => VocabularyState::Stale,
    }
}

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    println!("Home: {}", config.home.display());

    let model_path = config.model_path();
    if !model_path.exists() {
        println!("Model: not trained");
        println!("\nRun `seedling train --corpus <cleaned posts>` to train one.");
        return Ok(());
    }

    let (model, saved_at) = TopicModel::load_with_saved_at(&model_path)?;
    let p = &model.params;
    println!(
        "Model: {} ({})",
        model_path.display(),
        file_size(&model_path)
    );
    println!("  Saved: {}", saved_at.format("%Y-%m-%d %H:%M UTC"));
    println!(
        "  Topics: {}  |  Iterations: {}  |  Refresh: {}  |  Random state: {}",
        p.n_topics, p.n_iter, p.refresh, p.random_state
    );
    println!(
        "  Seed confidence: {:.2}  |  alpha: {}  |  eta: {}",
        p.seed_confidence, p.alpha, p.eta
    );
    println!("  Log-likelihood per token: {:.4}", model.log_likelihood);
    println!(
        "  Vocabulary: {} terms (fingerprint {})",
        model.vocab_size,
        truncate_chars(&model.vocab_fingerprint, 12)
    );

    let vocab_path = config.vocab_path();
    let vocab = if vocab_path.exists() {
        Some(Vocabulary::load(&vocab_path)?)
    } else {
        None
    };
    match vocabulary_state(&model, vocab.as_ref()) {
        VocabularyState::Matches => {
            println!("Vocabulary file: {}", "matches model".green());
        }
        VocabularyState::Stale => {
            println!(
                "Vocabulary file: {}",
                "does not match model, retrain before labeling posts".red()
            );
        }
        VocabularyState::Missing => {
            println!("Vocabulary file: {}", "missing".red());
        }
    }

    match config.labels.validate_for(model.n_topics()) {
        Ok(()) => println!("Labels: {}", config.labels.as_slice().join(", ")),
        Err(e) => println!("Labels: {}", e.to_string().red()),
    }

    for (name, path) in [
        ("Hashtag dump", config.hashtag_dump_path()),
        ("Raw feed", config.feed_raw_path()),
    ] {
        if path.exists() {
            println!("{name}: {} ({})", path.display(), file_size(&path));
        } else {
            println!("{name}: none yet");
        }
    }

    Ok(())
}

fn file_size(path: &Path) -> String {
    std::fs::metadata(path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

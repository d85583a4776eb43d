// Colored terminal output for topics, training results and labeled posts.
//
// This module handles all terminal-specific formatting. The pipeline and
// status modules delegate here.

use std::path::Path;

use colored::Colorize;

use crate::encode::EncodedCorpus;
use crate::error::TopicError;
use crate::labels::TopicLabels;
use crate::model::TopicModel;
use crate::pipeline::classify::Classification;

/// Display the top words of every topic under its label.
pub fn display_topics(
    labels: &TopicLabels,
    top_words: &[Vec<(String, f64)>],
) -> Result<(), TopicError> {
    println!("\n{}", "=== Topics ===".bold());
    for (topic, words) in top_words.iter().enumerate() {
        let label = labels.label(topic)?;
        let list = words
            .iter()
            .map(|(w, _)| w.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  Topic {} {:<16} {}",
            topic,
            colorize_label(label),
            list.dimmed()
        );
    }
    println!();
    Ok(())
}

/// One-paragraph summary of a finished training run.
pub fn display_train_summary(model: &TopicModel, corpus: &EncodedCorpus, model_path: &Path) {
    let placeholders = corpus.documents.iter().filter(|d| d.is_placeholder()).count();
    println!(
        "\n{} {} topics over {} documents ({} tokens, {} with no vocabulary overlap)",
        "Trained".green().bold(),
        model.n_topics(),
        corpus.len(),
        corpus.total_tokens(),
        placeholders
    );
    println!(
        "  Log-likelihood per token: {:.4}  |  Seed confidence: {:.2}  |  Random state: {}",
        model.log_likelihood, model.params.seed_confidence, model.params.random_state
    );
    println!("  Model saved to {}", model_path.display());
}

/// Print "Top topic: <label> [Post: '<raw post>']" for every post.
pub fn display_classifications(results: &[Classification]) {
    if results.is_empty() {
        println!("No posts to label.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Topics for {} posts ===", results.len()).bold()
    );
    for result in results {
        let line = format!(
            "Top topic: {} [Post: '{}']",
            colorize_label(&result.label),
            result.post.text
        );
        if result.no_overlap {
            println!("{} {}", line, "(no vocabulary overlap)".dimmed());
        } else {
            println!("{line}");
        }
    }

    let unmatched = results.iter().filter(|r| r.no_overlap).count();
    if unmatched > 0 {
        println!(
            "\n  {} {} posts shared no words with the vocabulary",
            "~".yellow(),
            unmatched
        );
    }
    println!();
}

/// Stable color per label so the same topic reads the same everywhere.
fn colorize_label(label: &str) -> colored::ColoredString {
    match label {
        "Sports" => label.green().bold(),
        "Business" => label.blue().bold(),
        "Arts/Literature" => label.magenta().bold(),
        "Politics" => label.red().bold(),
        "Misc" => label.dimmed(),
        _ => label.cyan(),
    }
}

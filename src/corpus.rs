// Cleaned-document files: one cleaned post per line.
//
// Empty lines are documents too (a post that cleaned down to nothing), so
// reading keeps them; that keeps line i aligned with raw post i.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::feed::RawPost;
use crate::text::{clean_post, StopWords};

/// Read a cleaned-document file. Every line is one document.
pub fn read_documents(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents {}", path.display()))?;
    Ok(text.lines().map(|l| l.trim().to_string()).collect())
}

/// Write documents, replacing the file.
pub fn write_documents<S: AsRef<str>>(path: &Path, documents: &[S]) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, join_lines(documents))
        .with_context(|| format!("Failed to write documents {}", path.display()))
}

/// Append documents to the end of the file, creating it if needed.
pub fn append_documents<S: AsRef<str>>(path: &Path, documents: &[S]) -> Result<()> {
    ensure_parent(path)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for appending", path.display()))?;
    file.write_all(join_lines(documents).as_bytes())
        .with_context(|| format!("Failed to append documents to {}", path.display()))
}

/// Clean raw posts into documents, one per post.
pub fn clean_posts(posts: &[RawPost], stop_words: &StopWords) -> Vec<String> {
    posts
        .iter()
        .map(|post| clean_post(&post.text, stop_words))
        .collect()
}

fn join_lines<S: AsRef<str>>(documents: &[S]) -> String {
    let mut text = String::new();
    for doc in documents {
        text.push_str(doc.as_ref());
        text.push('\n');
    }
    text
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

// Raw feed file — one post per line as `<post id>\t<post text>`.
//
// Line order is the post order every later stage relies on: cleaned line i,
// encoded line i and classification i all belong to raw post i.

use std::path::Path;

use anyhow::{Context, Result};

/// A post as fetched, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub id: String,
    pub text: String,
}

impl RawPost {
    /// Build a post, flattening line breaks and tabs so it fits on one line
    /// of the raw feed file.
    pub fn new(id: impl Into<String>, text: &str) -> Self {
        let text = text
            .replace('\r', "")
            .replace(['\n', '\t'], " ")
            .trim()
            .to_string();
        Self {
            id: id.into(),
            text,
        }
    }

    pub fn to_line(&self) -> String {
        format!("{}\t{}", self.id, self.text)
    }

    /// Parse a raw feed line. A line without a tab is all text, with an
    /// empty id.
    pub fn parse_line(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.split_once('\t') {
            Some((id, text)) => Self {
                id: id.trim().to_string(),
                text: text.trim_start_matches('\t').trim().to_string(),
            },
            None => Self {
                id: String::new(),
                text: line.trim().to_string(),
            },
        }
    }
}

/// Write posts to a raw feed file, replacing it.
pub fn write_raw_posts(path: &Path, posts: &[RawPost]) -> Result<()> {
    let mut text = String::new();
    for post in posts {
        text.push_str(&post.to_line());
        text.push('\n');
    }
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write raw feed {}", path.display()))
}

/// Read a raw feed file. Blank lines are not posts and are skipped.
pub fn read_raw_posts(path: &Path) -> Result<Vec<RawPost>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read raw feed {}", path.display()))?;
    Ok(text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(RawPost::parse_line)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_flattens_lines() {
        let post = RawPost::new("42", "line one\r\nline\ttwo\n");
        assert_eq!(post.text, "line one line two");
        assert_eq!(post.to_line(), "42\tline one line two");
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            RawPost::parse_line("at://x/1\t\tBig win tonight"),
            RawPost {
                id: "at://x/1".into(),
                text: "Big win tonight".into()
            }
        );
        assert_eq!(RawPost::parse_line("no id here").id, "");
    }

    #[test]
    fn test_file_round_trip_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.txt");
        let posts = vec![RawPost::new("1", "first"), RawPost::new("2", "second")];
        write_raw_posts(&path, &posts).unwrap();
        std::fs::write(&path, std::fs::read_to_string(&path).unwrap() + "\n\n").unwrap();
        assert_eq!(read_raw_posts(&path).unwrap(), posts);
    }
}

// Post cleaning: raw post text in, cleaned token string out.
//
// Steps: drop URLs and @mentions, lowercase, strip punctuation from every
// token, keep purely alphabetic tokens, drop stopwords. The result is the
// whitespace-joined token string the vocabulary builder and encoder consume.

use std::sync::OnceLock;

use regex_lite::Regex;

use super::lexicon::StopWords;

fn noise_pattern() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| {
        Regex::new(r"(?:https?://\S+|www\.\S+|@[A-Za-z0-9_.\-]+)").expect("valid noise regex")
    })
}

/// Clean a raw post into a space-separated string of content tokens.
///
/// Hashtags keep their word (`#Soccer` becomes `soccer`). A post with no
/// surviving tokens cleans to the empty string; it still counts as a post.
pub fn clean_post(text: &str, stop_words: &StopWords) -> String {
    let without_noise = noise_pattern().replace_all(text, " ");

    without_noise
        .split_whitespace()
        .map(|token| {
            token
                .to_lowercase()
                .chars()
                .filter(|c| !c.is_ascii_punctuation())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty() && word.chars().all(char::is_alphabetic))
        .filter(|word| !stop_words.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

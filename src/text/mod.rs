// Text normalization — post cleaning and the term predicates used by the
// vocabulary builder.
//
// Everything downstream of this module sees a post as a single string of
// lowercase, whitespace-separated tokens.

pub mod clean;
pub mod lexicon;

pub use clean::clean_post;
pub use lexicon::{AlphabeticLexicon, Lexicon, StopWords, WordListLexicon};

// Document encoding — cleaned documents to sparse LDA-C lines.
//
// One input document always produces exactly one encoded document. Documents
// with no vocabulary overlap get the placeholder line so line N of an LDA-C
// file still points at post N.

pub mod corpus;
pub mod sparse;

pub use corpus::EncodedCorpus;
pub use sparse::{encode_document, parse_line, EncodedDocument, TermCount, PLACEHOLDER_INDEX};

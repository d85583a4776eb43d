// Unit tests for LDA-C encoding and parsing.
//
// Covers the line format (1-based ascending indices, raw counts), the
// placeholder line, one-line-per-document alignment, and the errors raised
// for malformed input.

use seedling::encode::{encode_document, parse_line, EncodedCorpus, EncodedDocument};
use seedling::vocab::Vocabulary;
use seedling::TopicError;

fn vocab() -> Vocabulary {
    Vocabulary::from_terms(["game", "win", "stock", "price", "policy"])
}

// ============================================================
// encode_document
// ============================================================

#[test]
fn encodes_counts_with_one_based_indices() {
    let doc = encode_document("game win great game", &vocab()).unwrap();
    assert_eq!(doc.to_line(), "2 1:2 2:1");
}

#[test]
fn unknown_terms_are_dropped_silently() {
    let doc = encode_document("price zebra price quokka", &vocab()).unwrap();
    assert_eq!(doc.to_line(), "1 4:2");
}

#[test]
fn no_overlap_gives_placeholder() {
    let doc = encode_document("weather weather", &vocab()).unwrap();
    assert!(doc.is_placeholder());
    assert_eq!(doc.to_line(), "1 1:1");

    let empty = encode_document("", &vocab()).unwrap();
    assert_eq!(empty, EncodedDocument::placeholder());
}

#[test]
fn empty_vocabulary_is_an_encoding_error() {
    let err = encode_document("game", &Vocabulary::default()).unwrap_err();
    assert!(matches!(err, TopicError::Encoding(_)));
}

#[test]
fn encoding_never_mutates_the_vocabulary() {
    let v = vocab();
    let before = v.fingerprint();
    let _ = encode_document("brand new words everywhere", &v).unwrap();
    assert_eq!(v.fingerprint(), before);
    assert_eq!(v.len(), 5);
}

// ============================================================
// parse_line
// ============================================================

#[test]
fn parse_recovers_counts() {
    let doc = parse_line("3 1:2 3:1 5:4", 5).unwrap();
    let counts: Vec<(usize, u32)> = doc.terms().iter().map(|t| (t.index, t.count)).collect();
    assert_eq!(counts, vec![(0, 2), (2, 1), (4, 4)]);
    assert_eq!(doc.total_tokens(), 7);
}

#[test]
fn parse_accepts_unsorted_pairs() {
    let doc = parse_line("2 4:1 2:3", 5).unwrap();
    assert_eq!(doc.to_line(), "2 2:3 4:1");
}

#[test]
fn parse_rejects_malformed_lines() {
    for line in [
        "",
        "x 1:1",
        "2 1:1",
        "1 1-1",
        "1 a:1",
        "1 1:b",
        "1 0:1",
        "1 6:1",
        "2 1:1 1:2",
        "1 1:0",
        "2 1:3 2:0",
        "0",
    ] {
        let err = parse_line(line, 5).unwrap_err();
        assert!(
            matches!(err, TopicError::Encoding(_)),
            "expected encoding error for {line:?}"
        );
    }
}

// ============================================================
// EncodedCorpus
// ============================================================

#[test]
fn corpus_line_count_matches_document_count() {
    let docs = vec!["game win", "", "weather", "stock price stock", "policy"];
    let corpus = EncodedCorpus::encode(&docs, &vocab()).unwrap();
    let text = corpus.to_ldac();
    assert_eq!(text.lines().count(), docs.len());
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec!["2 1:1 2:1", "1 1:1", "1 1:1", "2 3:2 4:1", "1 5:1"]
    );
}

#[test]
fn encode_then_parse_reproduces_counts() {
    let v = vocab();
    let docs = vec!["game win great game", "stock price stock policy"];
    let corpus = EncodedCorpus::encode(&docs, &v).unwrap();
    let parsed = EncodedCorpus::from_ldac(&corpus.to_ldac(), &v).unwrap();
    assert_eq!(parsed, corpus);
}

#[test]
fn from_ldac_reports_line_number() {
    let err = EncodedCorpus::from_ldac("1 1:1\n1 9:1\n", &vocab()).unwrap_err();
    match err {
        TopicError::Encoding(msg) => assert!(msg.starts_with("line 2:"), "{msg}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn ldac_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.ldac");
    let v = vocab();
    let corpus = EncodedCorpus::encode(&["win win", "nothing here"], &v).unwrap();
    corpus.write_ldac(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 2:2\n1 1:1\n");

    // Read back, the placeholder line is an ordinary one-token document.
    let read = EncodedCorpus::read_ldac(&path, &v).unwrap();
    assert_eq!(read.len(), 2);
    assert_eq!(read.vocab_fingerprint, v.fingerprint());
}

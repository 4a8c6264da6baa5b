//! Integration tests for vocabulary parsing, truncation resilience, and the
//! diagnostics sink.
//!
//! These tests verify that malformed vocabulary buffers degrade into smaller
//! but usable engines, that every recoverable anomaly reaches an injected
//! diagnostics sink, and that tiktoken-format interop round-trips.

use std::sync::{Arc, Mutex};

use trietok::{load_binary_vocab, tiktoken_to_binary, Diagnostics, Tokenizer, VocabDefect};

/// Serialize tokens into the length-prefixed binary vocabulary format.
fn vocab(tokens: &[&[u8]]) -> Vec<u8> {
    let mut data = Vec::new();
    for token in tokens {
        data.push(token.len() as u8);
        data.extend_from_slice(token);
    }
    data
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    InvalidEntry { offset: usize, declared_len: usize },
    DuplicateToken { token: Vec<u8>, earlier_id: u32, later_id: u32 },
    UnmatchedByte { offset: usize, byte: u8 },
    InvalidTokenId { id: u32 },
}

/// Sink that records every diagnostic for later inspection.
#[derive(Debug, Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Diagnostics for Recorder {
    fn invalid_vocab_entry(&self, offset: usize, declared_len: usize) {
        self.events.lock().unwrap().push(Event::InvalidEntry {
            offset,
            declared_len,
        });
    }

    fn duplicate_token(&self, token: &[u8], earlier_id: u32, later_id: u32) {
        self.events.lock().unwrap().push(Event::DuplicateToken {
            token: token.to_vec(),
            earlier_id,
            later_id,
        });
    }

    fn unmatched_byte(&self, offset: usize, byte: u8) {
        self.events
            .lock()
            .unwrap()
            .push(Event::UnmatchedByte { offset, byte });
    }

    fn invalid_token_id(&self, id: u32) {
        self.events.lock().unwrap().push(Event::InvalidTokenId { id });
    }
}

/// A final entry whose declared length overruns the buffer truncates the
/// vocabulary; everything before it stays usable.
#[test]
fn test_truncated_vocabulary_resilience() {
    let data = [1, b'a', 1, b'b', 5, b'x'];
    let tokenizer = Tokenizer::new(&data);

    assert_eq!(tokenizer.vocab_size(), 2);
    assert_eq!(tokenizer.encode("ab"), vec![1, 2]);
    assert_eq!(tokenizer.decode(&[1, 2]).unwrap(), "ab");
    assert_eq!(
        tokenizer.defect(),
        Some(VocabDefect {
            offset: 4,
            declared_len: 5
        })
    );
}

/// A zero length byte is invalid and stops parsing in the same way.
#[test]
fn test_zero_length_entry_truncates() {
    let data = [2, b'o', b'k', 0, 1, b'b'];
    let tokenizer = Tokenizer::new(&data);

    assert_eq!(tokenizer.vocab_size(), 1);
    assert_eq!(
        tokenizer.defect(),
        Some(VocabDefect {
            offset: 3,
            declared_len: 0
        })
    );
}

/// A fully invalid or empty buffer still yields a usable trivial engine.
#[test]
fn test_degenerate_vocabularies_still_construct() {
    for data in [&[] as &[u8], &[0], &[200, b'x']] {
        let tokenizer = Tokenizer::new(data);
        assert!(tokenizer.is_empty());
        assert_eq!(tokenizer.encode("anything"), Vec::<u32>::new());
        assert_eq!(tokenizer.decode(&[1]).unwrap(), "");
        assert_eq!(tokenizer.count("anything"), 0);
    }
}

/// Construction reports the truncating entry to the injected sink.
#[test]
fn test_construction_diagnostics() {
    let sink = Arc::new(Recorder::default());
    let data = [1, b'a', 9, b'x'];
    let _tokenizer = Tokenizer::with_diagnostics(&data, sink.clone());

    assert_eq!(
        sink.events(),
        vec![Event::InvalidEntry {
            offset: 2,
            declared_len: 9
        }]
    );
}

/// Every unmatched-byte skip reports its offset and byte value.
#[test]
fn test_encode_diagnostics() {
    let sink = Arc::new(Recorder::default());
    let tokenizer = Tokenizer::with_diagnostics(&vocab(&[b"x"]), sink.clone());

    assert_eq!(tokenizer.encode("xyzx"), vec![1, 1]);
    assert_eq!(
        sink.events(),
        vec![
            Event::UnmatchedByte { offset: 1, byte: b'y' },
            Event::UnmatchedByte { offset: 2, byte: b'z' },
        ]
    );
}

/// Every skipped identifier reports its value, and decoding resumes.
#[test]
fn test_decode_diagnostics() {
    let sink = Arc::new(Recorder::default());
    let tokenizer = Tokenizer::with_diagnostics(&vocab(&[b"a", b"b"]), sink.clone());

    assert_eq!(tokenizer.decode(&[0, 1, 7, 2]).unwrap(), "ab");
    assert_eq!(
        sink.events(),
        vec![
            Event::InvalidTokenId { id: 0 },
            Event::InvalidTokenId { id: 7 },
        ]
    );
}

/// Duplicate entries are reported with both identifiers (1-based).
#[test]
fn test_duplicate_token_diagnostics() {
    let sink = Arc::new(Recorder::default());
    let _tokenizer = Tokenizer::with_diagnostics(&vocab(&[b"ab", b"cd", b"ab"]), sink.clone());

    assert_eq!(
        sink.events(),
        vec![Event::DuplicateToken {
            token: b"ab".to_vec(),
            earlier_id: 1,
            later_id: 3
        }]
    );
}

/// Tokens can hold arbitrary bytes up to the 255-byte length limit.
#[test]
fn test_max_length_and_binary_tokens() {
    let long = [b'z'; 255];
    let data = vocab(&[&long, &[0x00, 0xff]]);
    let (tokens, defect) = load_binary_vocab(&data);

    assert!(defect.is_none());
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].len(), 255);

    let tokenizer = Tokenizer::new(&data);
    let input: Vec<u8> = long.iter().copied().chain([0x00, 0xff]).collect();
    assert_eq!(tokenizer.encode_bytes(&input), vec![1, 2]);
    assert_eq!(tokenizer.decode_bytes(&[1, 2]), input);
}

/// A tiktoken-format vocabulary converts to binary and drives the engine.
#[test]
fn test_tiktoken_interop() {
    // "the" = "dGhl", "cat" = "Y2F0", " " = "IA=="
    let tiktoken = b"dGhl 0\nY2F0 1\nIA== 2\n";
    let bin = tiktoken_to_binary(tiktoken).unwrap();
    let tokenizer = Tokenizer::new(&bin);

    assert_eq!(tokenizer.vocab_size(), 3);
    assert_eq!(tokenizer.encode("the cat"), vec![1, 3, 2]);
    assert_eq!(tokenizer.decode(&[1, 3, 2]).unwrap(), "the cat");
}

//! Trietok - vocabulary-driven greedy longest-match tokenizer.
//!
//! A small tokenization engine featuring:
//! - Byte-level prefix trie compiled once from a length-prefixed binary
//!   vocabulary
//! - Greedy longest-match encoding (the longest entry covering the current
//!   position always wins)
//! - Reversible +1-shifted identifiers with 0 reserved as the invalid
//!   sentinel
//! - Graceful degradation: truncated vocabularies, unmatched bytes, and
//!   invalid identifiers are skipped and reported, never fatal
//! - Injectable diagnostics sink (silent by default, `log`-backed)
//! - Rayon parallelism for batch encode/decode across independent inputs
//! - Tiktoken text-format interop for vocabulary files

pub mod core;

pub use core::{
    binary_to_tiktoken, load_binary_vocab, load_binary_vocab_file, tiktoken_to_binary, Diagnostics,
    LogDiagnostics, NullDiagnostics, Tokenizer, TokenizerError, Trie, VocabDefect, VocabError,
};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

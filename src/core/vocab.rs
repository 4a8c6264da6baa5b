//! Vocabulary loading utilities for the length-prefixed binary format.
//!
//! # Binary Format
//!
//! A vocabulary is a flat byte buffer of concatenated entries with no header,
//! footer, separators, or checksum:
//!
//! ```text
//! repeat until the buffer is exhausted:
//!   1 byte:             token_length   (must be >= 1)
//!   token_length bytes: raw token bytes
//! ```
//!
//! Token identifiers are not stored; they are implicit in entry order,
//! assigned `0, 1, 2, ...` front to back. Decoding relies on that positional
//! correspondence, so entry order is significant.
//!
//! A `token_length` of 0, or a length that would read past the end of the
//! buffer, is invalid. Parsing stops at the first invalid entry and keeps
//! everything before it, so a truncated file still yields a usable (smaller)
//! vocabulary; the condition is surfaced as a [`VocabDefect`].
//!
//! # Tiktoken Interop
//!
//! [`tiktoken_to_binary`] and [`binary_to_tiktoken`] convert between this
//! format and the text-based tiktoken format (`base64_token rank` per line).
//! Ranks are positional in the binary format, so they are dropped on the way
//! in and regenerated on the way out.

use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

/// Errors that can occur when loading or converting vocabulary files.
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Invalid base64 encoding: {0}")]
    Base64Error(#[from] base64::DecodeError),
    #[error("Invalid line format: {0}")]
    ParseError(String),
    #[error("Token of {0} bytes exceeds the single-byte length prefix (max 255)")]
    TokenTooLong(usize),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Description of the invalid entry that stopped vocabulary parsing.
///
/// `offset` is the position of the offending length byte in the buffer and
/// `declared_len` is the length it declared (0, or one overrunning the
/// buffer). All entries before `offset` were parsed and remain valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabDefect {
    pub offset: usize,
    pub declared_len: usize,
}

/// Parse a binary vocabulary buffer into an ordered token list.
///
/// Returns the tokens parsed before the first invalid entry, plus the defect
/// describing that entry when one was hit. An empty or immediately invalid
/// buffer yields an empty token list, which is still a usable vocabulary.
pub fn load_binary_vocab(data: &[u8]) -> (Vec<Vec<u8>>, Option<VocabDefect>) {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + 1 + len > data.len() {
            return (
                tokens,
                Some(VocabDefect {
                    offset: i,
                    declared_len: len,
                }),
            );
        }
        tokens.push(data[i + 1..i + 1 + len].to_vec());
        i += 1 + len;
    }
    (tokens, None)
}

/// Load a binary vocabulary from a file path.
pub fn load_binary_vocab_file(
    path: &str,
) -> Result<(Vec<Vec<u8>>, Option<VocabDefect>), VocabError> {
    let data = std::fs::read(path)?;
    Ok(load_binary_vocab(&data))
}

/// Convert a tiktoken-format vocabulary to the binary format.
///
/// Each line is `base64_token rank`; tokens are emitted as `[len][bytes]`
/// entries in line order and ranks are dropped (identifiers are positional in
/// the binary format). Empty lines and lines with an empty token are skipped.
pub fn tiktoken_to_binary(data: &[u8]) -> Result<Vec<u8>, VocabError> {
    let mut out = Vec::new();

    for line in data.split(|&b| b == b'\n') {
        if line.is_empty() {
            continue;
        }

        let space_pos = line
            .iter()
            .rposition(|&b| b == b' ')
            .ok_or_else(|| VocabError::ParseError("Missing space separator".to_string()))?;

        let token = STANDARD.decode(&line[..space_pos])?;
        if token.is_empty() {
            continue;
        }
        if token.len() > u8::MAX as usize {
            return Err(VocabError::TokenTooLong(token.len()));
        }

        out.push(token.len() as u8);
        out.extend_from_slice(&token);
    }

    Ok(out)
}

/// Convert a binary vocabulary to the tiktoken text format.
///
/// The inverse of [`tiktoken_to_binary`]: one `base64_token rank` line per
/// entry, ranks counting up from 0 in entry order. Parsing stops at the first
/// invalid entry, reported through the returned [`VocabDefect`].
pub fn binary_to_tiktoken(data: &[u8]) -> (String, Option<VocabDefect>) {
    let (tokens, defect) = load_binary_vocab(data);
    let mut out = String::new();
    for (rank, token) in tokens.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{} {}", STANDARD.encode(token), rank);
    }
    (out, defect)
}

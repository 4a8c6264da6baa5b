use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use super::diagnostics::{Diagnostics, LogDiagnostics};
use super::trie::Trie;
use super::vocab::{load_binary_vocab, VocabDefect, VocabError};

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Vocabulary error: {0}")]
    VocabError(#[from] VocabError),
    #[error("Decoding error: invalid UTF-8")]
    Utf8Error,
}

/// Greedy longest-match tokenizer over a fixed byte-string vocabulary.
///
/// Built once from a binary vocabulary buffer (see [`crate::core::vocab`]),
/// the tokenizer owns a prefix trie and the inverse id-to-token table and
/// never mutates either afterwards. Every method takes `&self` and the struct
/// is `Send + Sync`, so one instance can serve unlimited concurrent
/// encode/decode/count calls without locking.
///
/// # Identifiers
///
/// Identifiers are dense and zero-based in vocabulary order, exposed shifted
/// by +1 so that 0 is reserved as the "no token" sentinel: [`encode`] only
/// emits values >= 1 and [`decode_bytes`] skips 0 as invalid. Identifiers
/// from two tokenizers built from different vocabularies are not comparable.
///
/// # Degraded input
///
/// Bad input never poisons the engine. A malformed vocabulary entry truncates
/// construction (everything parsed before it stays usable), an input byte no
/// token matches is skipped without output, and an out-of-range identifier
/// decodes to nothing. Each such event is reported to the injectable
/// [`Diagnostics`] sink, which by default forwards to the `log` facade.
///
/// [`encode`]: Tokenizer::encode
/// [`decode_bytes`]: Tokenizer::decode_bytes
#[derive(Clone)]
pub struct Tokenizer {
    trie: Trie,
    id_to_token: Vec<Vec<u8>>,
    defect: Option<VocabDefect>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Tokenizer {
    /// Build a tokenizer from a binary vocabulary buffer.
    ///
    /// Construction always succeeds: an empty or fully invalid buffer yields
    /// a trivial engine that skips every input byte. A malformed entry midway
    /// keeps all earlier entries and is surfaced via [`defect`] and the
    /// diagnostics sink (the default sink, [`LogDiagnostics`]).
    ///
    /// [`defect`]: Tokenizer::defect
    pub fn new(vocab_data: &[u8]) -> Self {
        Self::with_diagnostics(vocab_data, Arc::new(LogDiagnostics))
    }

    /// Build a tokenizer with a caller-provided diagnostics sink.
    pub fn with_diagnostics(vocab_data: &[u8], diagnostics: Arc<dyn Diagnostics>) -> Self {
        let (id_to_token, defect) = load_binary_vocab(vocab_data);
        if let Some(d) = defect {
            diagnostics.invalid_vocab_entry(d.offset, d.declared_len);
        }

        let mut trie = Trie::new();
        for (id, token) in id_to_token.iter().enumerate() {
            if let Some(earlier) = trie.insert(token, id as u32) {
                // Last insertion wins for encode; both ids stay decodable.
                diagnostics.duplicate_token(token, earlier.get(), id as u32 + 1);
            }
        }

        Self {
            trie,
            id_to_token,
            defect,
            diagnostics,
        }
    }

    /// Build a tokenizer from a binary vocabulary file.
    pub fn from_file(vocab_path: &str) -> Result<Self, TokenizerError> {
        let data = std::fs::read(vocab_path).map_err(VocabError::from)?;
        Ok(Self::new(&data))
    }

    /// Encode text to token identifiers (all >= 1).
    ///
    /// Scans left to right; at each position the longest vocabulary entry
    /// matching a prefix of the remaining input wins. A byte no entry matches
    /// is skipped and contributes nothing to the output, so the result can
    /// cover fewer bytes than the input; each skip is reported to the
    /// diagnostics sink.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.encode_bytes(text.as_bytes())
    }

    /// Encode a raw byte sequence to token identifiers.
    pub fn encode_bytes(&self, bytes: &[u8]) -> Vec<u32> {
        let mut result = Vec::with_capacity(bytes.len() / 2);
        let mut i = 0;
        while i < bytes.len() {
            match self.trie.longest_match(&bytes[i..]) {
                Some((id, len)) => {
                    result.push(id.get());
                    i += len;
                }
                None => {
                    self.diagnostics.unmatched_byte(i, bytes[i]);
                    i += 1;
                }
            }
        }
        result
    }

    /// Count the tokens [`encode`] would produce, without building the
    /// identifier sequence.
    ///
    /// Runs the same greedy walk as [`encode`], including the
    /// unmatched-byte skips and their diagnostics.
    ///
    /// [`encode`]: Tokenizer::encode
    pub fn count(&self, text: &str) -> usize {
        self.count_bytes(text.as_bytes())
    }

    /// Count the tokens [`encode_bytes`] would produce.
    ///
    /// [`encode_bytes`]: Tokenizer::encode_bytes
    pub fn count_bytes(&self, bytes: &[u8]) -> usize {
        let mut count = 0;
        let mut i = 0;
        while i < bytes.len() {
            match self.trie.longest_match(&bytes[i..]) {
                Some((_, len)) => {
                    count += 1;
                    i += len;
                }
                None => {
                    self.diagnostics.unmatched_byte(i, bytes[i]);
                    i += 1;
                }
            }
        }
        count
    }

    /// Decode token identifiers back to bytes.
    ///
    /// Identifiers of 0 or beyond the vocabulary are skipped (reported to the
    /// diagnostics sink) and decoding resumes with the next identifier; one
    /// bad value never fails the call.
    pub fn decode_bytes(&self, tokens: &[u32]) -> Vec<u8> {
        let mut result = Vec::with_capacity(tokens.len() * 4);
        for &id in tokens {
            if id == 0 || id as usize > self.id_to_token.len() {
                self.diagnostics.invalid_token_id(id);
                continue;
            }
            result.extend_from_slice(&self.id_to_token[(id - 1) as usize]);
        }
        result
    }

    /// Decode token identifiers to a string.
    pub fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        String::from_utf8(self.decode_bytes(tokens)).map_err(|_| TokenizerError::Utf8Error)
    }

    /// Decode token identifiers to a string, replacing invalid UTF-8 with the
    /// replacement character.
    pub fn decode_lossy(&self, tokens: &[u32]) -> String {
        String::from_utf8_lossy(&self.decode_bytes(tokens)).into_owned()
    }

    /// Batch encode multiple texts in parallel.
    ///
    /// Each text is still encoded single-pass; parallelism is across texts.
    pub fn encode_batch(&self, texts: &[String]) -> Vec<Vec<u32>> {
        texts.par_iter().map(|text| self.encode(text)).collect()
    }

    /// Batch count multiple texts in parallel.
    pub fn count_batch(&self, texts: &[String]) -> Vec<usize> {
        texts.par_iter().map(|text| self.count(text)).collect()
    }

    /// Batch decode multiple token lists in parallel.
    pub fn decode_batch(&self, token_lists: &[Vec<u32>]) -> Result<Vec<String>, TokenizerError> {
        token_lists
            .par_iter()
            .map(|tokens| self.decode(tokens))
            .collect()
    }

    /// Batch decode multiple token lists in parallel, replacing invalid UTF-8.
    pub fn decode_batch_lossy(&self, token_lists: &[Vec<u32>]) -> Vec<String> {
        token_lists
            .par_iter()
            .map(|tokens| self.decode_lossy(tokens))
            .collect()
    }

    /// Number of tokens in the vocabulary.
    ///
    /// Valid identifiers are exactly `1..=vocab_size()`.
    pub fn vocab_size(&self) -> usize {
        self.id_to_token.len()
    }

    /// Whether the vocabulary is empty (a trivial engine that matches
    /// nothing).
    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// The bytes of the token named by `id`, or `None` for 0 or out-of-range
    /// identifiers.
    pub fn token_bytes(&self, id: u32) -> Option<&[u8]> {
        if id == 0 {
            return None;
        }
        self.id_to_token.get((id - 1) as usize).map(|t| t.as_slice())
    }

    /// The invalid entry that truncated vocabulary parsing, if any.
    pub fn defect(&self) -> Option<VocabDefect> {
        self.defect
    }
}

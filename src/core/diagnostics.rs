//! Injectable sink for recoverable tokenizer anomalies.
//!
//! None of the conditions reported here abort a call: a malformed vocabulary
//! entry truncates the vocabulary, an unmatched byte is skipped, an invalid
//! identifier contributes nothing to decode output. The sink exists so those
//! events are observable without the engine writing to stdout, and so tests
//! can record them instead of capturing console output.
//!
//! [`LogDiagnostics`] is the default sink and forwards to the `log` facade,
//! which keeps the engine silent unless the host installs a logger.

/// Observer for recoverable anomalies during construction, encode, and decode.
///
/// All methods default to no-ops, so implementors only override the events
/// they care about. Implementations must be `Send + Sync`; the engine may be
/// shared across threads and reports from any of them.
pub trait Diagnostics: Send + Sync {
    /// An entry with length `declared_len` (0, or overrunning the buffer) was
    /// found at byte `offset`; vocabulary parsing stopped there.
    fn invalid_vocab_entry(&self, _offset: usize, _declared_len: usize) {}

    /// `token` appeared twice in the vocabulary. Identifier `later_id`
    /// overwrote `earlier_id` in the trie, so only `later_id` is reachable
    /// via encode; both remain decodable.
    fn duplicate_token(&self, _token: &[u8], _earlier_id: u32, _later_id: u32) {}

    /// No vocabulary entry matches any prefix of the input at `offset`; the
    /// single byte `byte` was skipped without producing a token.
    fn unmatched_byte(&self, _offset: usize, _byte: u8) {}

    /// A decode identifier was 0 or beyond the vocabulary; it was skipped.
    fn invalid_token_id(&self, _id: u32) {}
}

/// Default sink: forwards anomalies to the `log` facade.
///
/// Construction-time anomalies are warnings; per-byte and per-identifier
/// skips during encode/decode are debug-level, since they can fire once per
/// input byte on vocabulary-poor input.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn invalid_vocab_entry(&self, offset: usize, declared_len: usize) {
        log::warn!(
            "invalid vocabulary entry at byte {}: declared length {}",
            offset,
            declared_len
        );
    }

    fn duplicate_token(&self, token: &[u8], earlier_id: u32, later_id: u32) {
        log::warn!(
            "duplicate vocabulary token {:?}: id {} shadows id {} for encoding",
            token,
            later_id,
            earlier_id
        );
    }

    fn unmatched_byte(&self, offset: usize, byte: u8) {
        log::debug!("no token matches input at offset {}: byte {:#04x}", offset, byte);
    }

    fn invalid_token_id(&self, id: u32) {
        log::debug!("invalid token id {}", id);
    }
}

/// Sink that discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {}

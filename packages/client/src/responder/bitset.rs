//! Bitset responses
//!
//! Endpoints that answer membership queries return a serialized bitset: the
//! bit length as a big-endian `u64`, followed by `ceil(len / 64)` big-endian
//! `u64` words, least significant bit first within each word.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use super::decode::{decode_json, decode_with};
use super::state::Cycle;
use super::target::Target;
use super::{Responder, erase};
use crate::error::{self, Error, Result};
use crate::http::{HttpRequest, HttpResponse};

const WORD_BITS: u64 = 64;
const WORD_BYTES: usize = 8;

/// Errors raised while reading a serialized bitset
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BitSetError {
    #[error("bitset header truncated: {0} bytes, need 8")]
    TruncatedHeader(usize),
    #[error("bitset of {bits} bits needs {expected} payload bytes, got {actual}")]
    LengthMismatch {
        bits: u64,
        expected: usize,
        actual: usize,
    },
    #[error("bitset length {0} does not fit in memory")]
    TooLarge(u64),
}

/// Fixed-length set of bits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    len: u64,
    words: Vec<u64>,
}

impl BitSet {
    /// All-clear bitset of `len` bits
    #[must_use]
    pub fn new(len: u64) -> Self {
        let words = vec![0; word_count(len).unwrap_or(0)];
        Self { len, words }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether bit `index` is set; out-of-range bits read as clear
    #[must_use]
    pub fn test(&self, index: u64) -> bool {
        if index >= self.len {
            return false;
        }
        let (word, bit) = split(index);
        self.words
            .get(word)
            .is_some_and(|w| w & (1 << bit) != 0)
    }

    /// Set bit `index`, growing the set when it lies past the end.
    ///
    /// An index whose set would be longer than `u64::MAX` bits, or would not
    /// fit in memory, is ignored.
    pub fn set(&mut self, index: u64) -> &mut Self {
        if index >= self.len {
            let Some((len, needed)) = index
                .checked_add(1)
                .and_then(|len| word_count(len).map(|words| (len, words)))
            else {
                tracing::warn!(index, "bit index out of range, ignored");
                return self;
            };
            self.len = len;
            self.words.resize(needed, 0);
        }
        let (word, bit) = split(index);
        if let Some(w) = self.words.get_mut(word) {
            *w |= 1 << bit;
        }
        self
    }

    /// Number of set bits
    #[must_use]
    pub fn count(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Serialize to the wire layout
    #[must_use]
    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(WORD_BYTES * (self.words.len() + 1));
        out.extend_from_slice(&self.len.to_be_bytes());
        for word in &self.words {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Parse the wire layout.
    ///
    /// # Errors
    ///
    /// Fails when the header is short or the payload does not hold exactly
    /// the number of words the header announces.
    pub fn from_binary(data: &[u8]) -> std::result::Result<Self, BitSetError> {
        let (header, payload) = data
            .split_first_chunk::<WORD_BYTES>()
            .ok_or(BitSetError::TruncatedHeader(data.len()))?;
        let len = u64::from_be_bytes(*header);
        let words = word_count(len).ok_or(BitSetError::TooLarge(len))?;
        let expected = words
            .checked_mul(WORD_BYTES)
            .ok_or(BitSetError::TooLarge(len))?;
        if payload.len() != expected {
            return Err(BitSetError::LengthMismatch {
                bits: len,
                expected,
                actual: payload.len(),
            });
        }

        let words = payload
            .chunks_exact(WORD_BYTES)
            .map(|chunk| {
                let mut word = [0u8; WORD_BYTES];
                word.copy_from_slice(chunk);
                u64::from_be_bytes(word)
            })
            .collect();
        Ok(Self { len, words })
    }
}

#[inline]
fn word_count(bits: u64) -> Option<usize> {
    usize::try_from(bits.div_ceil(WORD_BITS)).ok()
}

#[inline]
fn split(index: u64) -> (usize, u64) {
    // index < len and len's word count fits usize, so the cast is lossless
    ((index / WORD_BITS) as usize, index % WORD_BITS)
}

/// Decodes a successful body as a serialized [`BitSet`].
///
/// Non-ok responses are JSON-decoded into the failure target.
pub struct BitsetResponder<F = ()> {
    cycle: Cycle<BitSet, F>,
}

impl BitsetResponder<()> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cycle: Cycle::new(Target::Value(BitSet::default()), Target::Skip),
        }
    }
}

impl Default for BitsetResponder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> BitsetResponder<F>
where
    F: DeserializeOwned + Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn with_failure(failure: F) -> Self {
        Self::with_targets(Target::Value(BitSet::default()), Target::Value(failure))
    }

    #[must_use]
    pub fn with_targets(success: Target<BitSet>, failure: Target<F>) -> Self {
        Self {
            cycle: Cycle::new(success, failure),
        }
    }

    #[must_use]
    pub fn with_predicate<P>(self, predicate: P) -> Self
    where
        P: Fn(StatusCode, &HttpResponse) -> bool + Send + Sync + 'static,
    {
        Self {
            cycle: self.cycle.predicate(Arc::new(predicate)),
        }
    }

    pub fn success(&self) -> Option<BitSet> {
        self.cycle.success()
    }

    pub fn failure(&self) -> Option<F> {
        self.cycle.failure()
    }

    pub fn success_raw(&self) -> Option<Bytes> {
        self.cycle.success_raw()
    }
}

impl<F> Responder for BitsetResponder<F>
where
    F: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
{
    fn respond(&self, request: Option<HttpRequest>, outcome: Result<HttpResponse>) -> &dyn Responder {
        self.cycle.record(request, outcome);
        self
    }

    fn do_response(&self) -> Result<HttpResponse> {
        self.cycle.decode_once(|ok, body, success, failure| {
            if ok {
                decode_with(success, body, |bytes| {
                    BitSet::from_binary(bytes).map_err(error::decode)
                })
            } else {
                decode_json(failure, body)
            }
        })
    }

    fn response(&self) -> Option<HttpResponse> {
        self.cycle.read().response.clone()
    }

    fn request(&self) -> Option<HttpRequest> {
        self.cycle.read().request.clone()
    }

    fn error(&self) -> Option<Error> {
        self.cycle.read().error()
    }

    fn success_any(&self) -> Option<Box<dyn Any + Send>> {
        erase(self.success())
    }

    fn failure_any(&self) -> Option<Box<dyn Any + Send>> {
        erase(self.failure())
    }

    fn is_ok(&self, status: StatusCode, response: &HttpResponse) -> bool {
        self.cycle.is_ok(status, response)
    }

    fn fresh(&self) -> Arc<dyn Responder> {
        Arc::new(Self {
            cycle: self.cycle.fresh(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<F: fmt::Debug> fmt::Debug for BitsetResponder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitsetResponder")
            .field("cycle", &self.cycle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_layout_is_length_then_words() {
        let mut bits = BitSet::new(70);
        bits.set(0).set(65);
        let wire = bits.to_binary();
        assert_eq!(wire.len(), 8 + 2 * 8);
        assert_eq!(&wire[..8], &70u64.to_be_bytes());
        assert_eq!(&wire[8..16], &1u64.to_be_bytes());
        assert_eq!(&wire[16..24], &2u64.to_be_bytes());

        let parsed = BitSet::from_binary(&wire).expect("valid layout");
        assert!(parsed.test(0));
        assert!(parsed.test(65));
        assert!(!parsed.test(1));
        assert_eq!(parsed.count(), 2);
    }

    #[test]
    fn rejects_short_and_trailing_payloads() {
        assert_eq!(
            BitSet::from_binary(&[0, 0, 1]),
            Err(BitSetError::TruncatedHeader(3))
        );
        let mut wire = BitSet::new(10).to_binary();
        wire.push(0);
        assert!(matches!(
            BitSet::from_binary(&wire),
            Err(BitSetError::LengthMismatch { bits: 10, expected: 8, actual: 9 })
        ));
    }

    #[test]
    fn set_grows_past_the_end() {
        let mut bits = BitSet::new(0);
        assert!(bits.is_empty());
        bits.set(128);
        assert_eq!(bits.len(), 129);
        assert!(bits.test(128));
        assert!(!bits.test(500));
    }

    #[test]
    fn set_ignores_index_past_the_largest_length() {
        let mut bits = BitSet::new(4);
        bits.set(u64::MAX);
        assert_eq!(bits.len(), 4);
        assert_eq!(bits.count(), 0);
    }

    #[test]
    fn whitespace_bytes_are_decoded_as_a_bitset() {
        let responder = BitsetResponder::new();
        let err = responder
            .respond(None, Ok(HttpResponse::new(StatusCode::OK, vec![b' '; 8])))
            .do_response()
            .expect_err("header announces words that are missing");
        assert!(err.is_decode());
        assert_eq!(responder.success_raw().map(|b| b.len()), Some(8));
    }

    #[test]
    fn responder_decodes_ok_body() {
        let mut bits = BitSet::new(8);
        bits.set(3);
        let responder = BitsetResponder::new();
        responder
            .respond(None, Ok(HttpResponse::new(StatusCode::OK, bits.to_binary())))
            .do_response()
            .expect("decodes");
        assert_eq!(responder.success(), Some(bits));
    }

    #[test]
    fn malformed_bitset_keeps_raw_body() {
        let responder = BitsetResponder::new();
        let err = responder
            .respond(None, Ok(HttpResponse::new(StatusCode::OK, vec![0u8, 0, 0, 0, 0, 0, 0, 64])))
            .do_response()
            .expect_err("payload missing");
        assert!(err.is_decode());
        assert_eq!(responder.success_raw().map(|b| b.len()), Some(8));
    }
}

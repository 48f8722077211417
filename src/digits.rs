//! Deterministic digit source.
//!
//! Every "random" decision in the generator (stochastic pruning, orientation
//! jitter, leaf gating) reads from a [`DigitStream`]: a fixed, finite run of
//! decimal digits addressed modulo its length. The read position lives in a
//! [`DigitCursor`] owned by the caller, so two passes with equal cursors see
//! equal digits.

use serde::{Deserialize, Serialize};

/// Default number of pi digits computed for a run.
pub const DEFAULT_PRECISION: usize = 10_000;

/// Largest precision accepted by parameter validation. The spigot is
/// quadratic in the digit count; this many digits take tens of seconds.
pub const MAX_PRECISION: usize = 100_000;

/// An immutable sequence of decimal digits, indexed modulo its length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigitStream {
    digits: Vec<u8>,
}

impl DigitStream {
    /// Computes the first `precision` digits of pi after the decimal point.
    ///
    /// `digit(0)` is `1`, `digit(1)` is `4`, and so on. A precision of zero is
    /// treated as one.
    pub fn pi(precision: usize) -> Self {
        Self {
            digits: pi_fraction_digits(precision.max(1)),
        }
    }

    /// Wraps an explicit digit sequence.
    ///
    /// Returns `None` if `digits` is empty or contains a value above 9.
    pub fn from_digits(digits: Vec<u8>) -> Option<Self> {
        if digits.is_empty() || digits.iter().any(|&d| d > 9) {
            return None;
        }
        Some(Self { digits })
    }

    /// Number of stored digits (the period of [`digit`](Self::digit)).
    pub fn precision(&self) -> usize {
        self.digits.len()
    }

    /// Digit at `index mod precision`.
    pub fn digit(&self, index: usize) -> u8 {
        self.digits[index % self.digits.len()]
    }
}

/// Read position into a [`DigitStream`].
///
/// Cursors are plain values: copying one forks the read position, and
/// [`reserve`](Self::reserve) hands out a disjoint slice for a nested pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigitCursor {
    position: usize,
}

impl DigitCursor {
    pub fn new(start: usize) -> Self {
        Self { position: start }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor to an absolute position.
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    pub fn advance(&mut self, count: usize) {
        self.position = self.position.wrapping_add(count);
    }

    /// Reads the digit under the cursor and steps past it.
    pub fn next(&mut self, stream: &DigitStream) -> u8 {
        let digit = stream.digit(self.position);
        self.advance(1);
        digit
    }

    /// Reads the digit `offset` places ahead without moving.
    pub fn peek(&self, stream: &DigitStream, offset: usize) -> u8 {
        stream.digit(self.position.wrapping_add(offset))
    }

    /// Splits off a cursor for the next `len` digits and moves `self` past them.
    pub fn reserve(&mut self, len: usize) -> DigitCursor {
        let slice = *self;
        self.advance(len);
        slice
    }
}

/// Integer spigot for pi in base 10 000, four digits per outer step.
///
/// Produces `3` followed by the fractional digits; the leading `3` is dropped.
/// Two extra chunks are computed so the tail is settled before truncation.
fn pi_fraction_digits(count: usize) -> Vec<u8> {
    const BASE: u64 = 10_000;
    const TERMS_PER_CHUNK: usize = 14;

    let chunks = (count + 1) / 4 + 2;
    let mut c = chunks * TERMS_PER_CHUNK;
    let mut f = vec![BASE / 5; c + 1];
    f[c] = 0;

    let mut out: Vec<u64> = Vec::with_capacity(chunks);
    let mut carry = 0u64;
    while c > 0 {
        let mut d = 0u64;
        let mut g = (c * 2) as u64;
        let mut b = c;
        loop {
            d += f[b] * BASE;
            g -= 1;
            f[b] = d % g;
            d /= g;
            g -= 1;
            b -= 1;
            if b == 0 {
                break;
            }
            d *= b as u64;
        }
        out.push(carry + d / BASE);
        carry = d % BASE;
        c -= TERMS_PER_CHUNK;
    }

    // A chunk can reach 10 000; push the overflow into its predecessor.
    for i in (1..out.len()).rev() {
        if out[i] >= BASE {
            out[i] -= BASE;
            out[i - 1] += 1;
        }
    }

    let mut digits = Vec::with_capacity(out.len() * 4);
    for chunk in out {
        digits.extend_from_slice(&[
            (chunk / 1000 % 10) as u8,
            (chunk / 100 % 10) as u8,
            (chunk / 10 % 10) as u8,
            (chunk % 10) as u8,
        ]);
    }
    digits.remove(0);
    digits.truncate(count);
    digits
}

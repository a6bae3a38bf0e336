//! Accumulator transfer across worker boundaries.
//!
//! Whenever a partial accumulator leaves its owning shard it crosses a
//! process boundary as bytes. The obligation at this seam is narrow: every
//! accumulator type must round-trip losslessly, `decode(encode(a)) == a`,
//! bit-exact for scalar accumulators (NaN payloads included) and exact pair
//! equality for `(sum, count)` pairs.
//!
//! Encoding is postcard over serde: finite, deterministic, and compact.
//! `f64` is fixed-width little-endian, so every bit pattern survives;
//! integers use varint/zigzag, which is lossless over the full domain.
//!
//! A failure here is a fatal stage failure. Recovery is retry-the-partition,
//! performed by the engine above this crate, never here.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Encode one accumulator as a deterministic byte sequence.
pub fn encode_accumulator<A: Serialize>(acc: &A) -> Result<Vec<u8>> {
    postcard::to_allocvec(acc).context("failed to encode accumulator")
}

/// Decode an accumulator previously produced by [`encode_accumulator`].
pub fn decode_accumulator<A: DeserializeOwned>(bytes: &[u8]) -> Result<A> {
    postcard::from_bytes(bytes).context("failed to decode accumulator")
}

//! Built-in numeric combiners for the per-key combine protocol.
//!
//! Four aggregates over three fixed numeric domains, as a closed set of
//! concrete types rather than one generic numeric abstraction — wraparound and
//! NaN semantics differ per domain and must be exact:
//!
//! - [`SumI32`] / [`SumI64`] / [`SumF64`] -- running total.
//! - [`MinI32`] / [`MinI64`] / [`MinF64`] -- minimum value.
//! - [`MaxI32`] / [`MaxI64`] / [`MaxF64`] -- maximum value.
//! - [`MeanI32`] / [`MeanI64`] / [`MeanF64`] -- average as `f64`.
//!
//! Domain semantics, pinned:
//! - integer sums wrap using native two's-complement `wrapping_add`, never
//!   saturate or widen;
//! - `f64` follows IEEE-754 and **NaN propagates** through sum, min, and max
//!   (one NaN input poisons the result, regardless of shard shape);
//! - Mean divides in double precision even for integer domains.
//!
//! Min/Max accumulators start at the domain's neutral element (`MAX`/`MIN`,
//! `+inf`/`-inf`). The neutral value only makes merging a zero-element partial
//! well-defined; the per-key protocol never extracts it standalone.

mod basic;
mod statistical;

pub use basic::{MaxF64, MaxI32, MaxI64, MinF64, MinI32, MinI64, SumF64, SumI32, SumI64};
pub use statistical::{MeanF64, MeanI32, MeanI64};

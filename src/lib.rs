//! # Keyfold
//!
//! An **associative combiner framework** for per-key aggregation over
//! arbitrarily partitioned collections. Keyfold is the combine core of a
//! distributed data-processing engine: it guarantees that partial aggregation
//! performed independently on disjoint shards, in any order, with any grouping
//! of partial results, yields the same answer as a single-threaded linear
//! scan — and that partial state survives cross-process transfer and
//! discard-and-retry.
//!
//! ## Key pieces
//!
//! - [`CombineFn`] — the create/add/merge/extract contract every aggregate
//!   implements. Merging must be associative and commutative; extraction must
//!   be pure and idempotent.
//! - [`combiners`] — the built-in numeric family: Sum, Min, Max, Mean over
//!   `i32`, `i64`, and `f64`, with exact wraparound and NaN semantics.
//! - [`CombineDriver`] — the per-key combine protocol: grouping, shard-local
//!   partial folds (combiner lifting), fanout-bounded merge rounds, final
//!   extraction. Runs sequentially or data-parallel over rayon.
//! - [`transfer`] — the accumulator transfer boundary: deterministic,
//!   lossless byte encoding for accumulators crossing workers.
//!
//! ## Quick start
//!
//! ```
//! use keyfold::{CombineDriver, ExecMode, SumI64};
//!
//! # fn main() -> anyhow::Result<()> {
//! let driver = CombineDriver {
//!     mode: ExecMode::Parallel { threads: None, partitions: Some(4) },
//!     ..Default::default()
//! };
//!
//! let sales = vec![
//!     ("product_a".to_string(), 100i64),
//!     ("product_b".to_string(), 200),
//!     ("product_a".to_string(), 150),
//! ];
//!
//! let mut totals = driver.combine_per_key(sales, &SumI64)?;
//! totals.sort();
//! assert_eq!(totals, vec![
//!     ("product_a".to_string(), 250),
//!     ("product_b".to_string(), 200),
//! ]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Correctness model
//!
//! Accumulators are plain values with exactly one owning execution context;
//! handoff to a merge is by value, never by live reference, so no locking
//! exists anywhere in the protocol. Integer sums wrap per fixed-width
//! two's-complement arithmetic by design; `f64` aggregates follow IEEE-754
//! with NaN propagation. See [`combiners`] for the pinned per-domain rules.

pub mod combiner;
pub mod combiners;
pub mod driver;
pub mod transfer;

pub use combiner::{CombineFn, Count, KfBound};
pub use combiners::{
    MaxF64, MaxI32, MaxI64, MeanF64, MeanI32, MeanI64, MinF64, MinI32, MinI64, SumF64, SumI32,
    SumI64,
};
pub use driver::{CombineDriver, ExecMode};
pub use transfer::{decode_accumulator, encode_accumulator};

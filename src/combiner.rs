//! The combiner contract: create / add / merge / extract.
//!
//! A [`CombineFn`] describes one associative per-key aggregate. The surrounding
//! engine folds each shard's values into a private accumulator, hands the
//! accumulator off **by value**, merges partials from different shards in any
//! grouping and any order, and projects the final accumulator exactly once per
//! key. The contract that makes this safe under retry and re-sharding:
//!
//! - `merge` is associative and commutative over accumulators built from
//!   disjoint sub-multisets of the same key's elements;
//! - `extract` is pure and idempotent;
//! - no operation blocks, performs I/O, or touches shared state.

use serde::{Serialize, de::DeserializeOwned};

/// Bound for anything that may cross a worker boundary: elements, keys, and
/// accumulators alike.
pub trait KfBound: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}
impl<T> KfBound for T where T: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}

/// An associative aggregate over input `V` with accumulator `A` and output `O`.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    /// Return the identity accumulator (no elements seen).
    fn create(&self) -> A;

    /// Fold one element into the accumulator. Must be total over the declared
    /// input domain, including its extrema.
    fn add_input(&self, acc: &mut A, v: V);

    /// Merge another accumulator into `acc`, consuming it. `other` was built
    /// independently from a disjoint sub-multiset of the same key's elements.
    fn merge(&self, acc: &mut A, other: A);

    /// Project a final accumulator to the visible result. Pure; safe to call
    /// again on an equal accumulator under speculative re-execution.
    fn extract(&self, acc: A) -> O;

    /// Merge a nonempty sequence of accumulators into one.
    ///
    /// # Panics
    /// If the sequence is empty. The grouping stage never produces a key with
    /// zero contributing accumulators, so an empty merge is a fatal bug in the
    /// caller, not a recoverable condition.
    fn merge_all<I>(&self, accs: I) -> A
    where
        I: IntoIterator<Item = A>,
        Self: Sized,
    {
        let mut it = accs.into_iter();
        let mut acc = it.next().expect("merge_all called with no accumulators");
        for other in it {
            self.merge(&mut acc, other);
        }
        acc
    }
}

/// Count of values per key.
///
/// - Accumulator: `u64`
/// - Output: `u64`
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, u64, u64> for Count {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _v: V) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn extract(&self, acc: u64) -> u64 {
        acc
    }
}

//! Execution driver for per-key and global combines.
//!
//! The protocol, per key, within one combine operation:
//!
//! 1. **Grouping** — each shard partitions its `(key, value)` records by key.
//! 2. **Local fold (combiner lifting)** — each shard folds its values into one
//!    accumulator per key via repeated `add_input` from `create`, replacing
//!    many raw values with one accumulator before any cross-worker transfer.
//! 3. **Transfer** — per-key partials leave their shard by value, encoded
//!    through [`crate::transfer`] and decoded on the receiving side.
//! 4. **Merge** — partials for the same key combine in fanout-bounded rounds.
//!    Merges need no locking: each step combines two closed values into a new
//!    closed value, and associativity/commutativity makes the round shape
//!    irrelevant to the result.
//! 5. **Extract** — once every shard's contribution is folded in, `extract`
//!    runs once per key.
//!
//! A key with zero elements never enters the protocol: grouping only creates
//! accumulators for observed keys, so absent keys are absent from the output.
//!
//! Because accumulators are pure values and every operation is side-effect
//! free, a shard's partial work can be discarded and recomputed at any point
//! without corrupting any other shard's state.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use anyhow::Result;
use rayon::prelude::*;

use crate::combiner::{CombineFn, KfBound};
use crate::transfer::{decode_accumulator, encode_accumulator};

/// How a combine operation executes.
#[derive(Clone, Copy, Debug)]
pub enum ExecMode {
    /// Single shard, in-process, no transfer boundary.
    Sequential,
    /// Data-parallel shards via rayon. `threads` optionally sizes the global
    /// pool; `partitions` overrides the driver's default shard count.
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

/// Drives combine operations over in-memory input.
pub struct CombineDriver {
    pub mode: ExecMode,
    pub default_partitions: usize,
    /// Merge at most this many partials per round. `None` merges everything
    /// in one round; small values (8, 16) bound merge breadth on huge inputs.
    pub fanout: Option<usize>,
}

impl Default for CombineDriver {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
            fanout: None,
        }
    }
}

impl CombineDriver {
    /// Combine values per key: one `(key, result)` per distinct key, in
    /// unspecified order.
    ///
    /// # Errors
    /// Fails only at the transfer boundary (accumulator encode/decode); the
    /// combiner operations themselves are total.
    pub fn combine_per_key<K, V, A, O, C>(&self, input: Vec<(K, V)>, comb: &C) -> Result<Vec<(K, O)>>
    where
        K: KfBound + Eq + Hash,
        V: KfBound,
        A: KfBound,
        C: CombineFn<V, A, O>,
    {
        match self.mode {
            ExecMode::Sequential => Ok(extract_all(local_fold(input, comb), comb)),
            ExecMode::Parallel { threads, partitions } => {
                if let Some(t) = threads {
                    // ok() to ignore "already built" on repeated calls in tests
                    rayon::ThreadPoolBuilder::new().num_threads(t).build_global().ok();
                }
                let parts = partitions.unwrap_or(self.default_partitions);
                self.combine_sharded(split_vec(input, parts), comb)
            }
        }
    }

    /// Per-key combine over caller-controlled shards.
    ///
    /// Shard boundaries and shard order never affect the result; this is the
    /// entry point the engine uses when the input already arrives partitioned.
    ///
    /// # Errors
    /// Fails only at the transfer boundary.
    pub fn combine_sharded<K, V, A, O, C>(
        &self,
        shards: Vec<Vec<(K, V)>>,
        comb: &C,
    ) -> Result<Vec<(K, O)>>
    where
        K: KfBound + Eq + Hash,
        V: KfBound,
        A: KfBound,
        C: CombineFn<V, A, O>,
    {
        // Local phase: one accumulator per key per shard, no coordination.
        let partials: Vec<HashMap<K, A>> = shards
            .into_par_iter()
            .map(|shard| local_fold(shard, comb))
            .collect();

        // Shuffle boundary: partials leave their shard by value, as bytes.
        let received: Vec<HashMap<K, A>> = partials
            .into_par_iter()
            .map(|m| decode_partials(encode_partials(m)?))
            .collect::<Result<_>>()?;

        let merged = self.merge_rounds(received, comb);
        Ok(extract_all(merged, comb))
    }

    /// Combine all elements (no key) into a single output.
    ///
    /// Produces exactly one result even for empty input, by extracting the
    /// identity accumulator.
    ///
    /// # Errors
    /// Fails only at the transfer boundary.
    pub fn combine_globally<V, A, O, C>(&self, input: Vec<V>, comb: &C) -> Result<O>
    where
        V: KfBound,
        A: KfBound,
        C: CombineFn<V, A, O>,
    {
        match self.mode {
            ExecMode::Sequential => {
                let mut acc = comb.create();
                for v in input {
                    comb.add_input(&mut acc, v);
                }
                Ok(comb.extract(acc))
            }
            ExecMode::Parallel { threads, partitions } => {
                if let Some(t) = threads {
                    rayon::ThreadPoolBuilder::new().num_threads(t).build_global().ok();
                }
                let parts = partitions.unwrap_or(self.default_partitions);

                let partials: Vec<A> = split_vec(input, parts)
                    .into_par_iter()
                    .map(|shard| {
                        let mut acc = comb.create();
                        for v in shard {
                            comb.add_input(&mut acc, v);
                        }
                        acc
                    })
                    .collect();

                let received: Vec<A> = partials
                    .into_par_iter()
                    .map(|a| decode_accumulator(&encode_accumulator(&a)?))
                    .collect::<Result<_>>()?;

                Ok(comb.extract(self.reduce_rounds(received, comb)))
            }
        }
    }

    /// Merge per-key partial maps in rounds of at most `fanout` maps each.
    fn merge_rounds<K, V, A, O, C>(&self, mut parts: Vec<HashMap<K, A>>, comb: &C) -> HashMap<K, A>
    where
        K: KfBound + Eq + Hash,
        A: KfBound,
        C: CombineFn<V, A, O>,
    {
        let fanout = self.fanout.unwrap_or(usize::MAX).max(2);
        while parts.len() > 1 {
            let groups: Vec<Vec<HashMap<K, A>>> = chunk_owned(parts, fanout);
            parts = groups
                .into_par_iter()
                .map(|group| merge_group(group, comb))
                .collect();
        }
        parts.into_iter().next().unwrap_or_default()
    }

    /// Merge plain accumulators in rounds of at most `fanout` each.
    fn reduce_rounds<V, A, O, C>(&self, mut accs: Vec<A>, comb: &C) -> A
    where
        A: KfBound,
        C: CombineFn<V, A, O>,
    {
        let fanout = self.fanout.unwrap_or(usize::MAX).max(2);
        while accs.len() > 1 {
            let groups: Vec<Vec<A>> = chunk_owned(accs, fanout);
            accs = groups
                .into_par_iter()
                .map(|group| comb.merge_all(group))
                .collect();
        }
        match accs.into_iter().next() {
            Some(acc) => acc,
            None => comb.create(),
        }
    }
}

/// Group one shard's records by key and fold each key's values into a single
/// accumulator (the combiner-lifting step).
fn local_fold<K, V, A, O, C>(shard: Vec<(K, V)>, comb: &C) -> HashMap<K, A>
where
    K: Eq + Hash,
    C: CombineFn<V, A, O>,
{
    let mut map: HashMap<K, A> = HashMap::new();
    for (k, v) in shard {
        comb.add_input(map.entry(k).or_insert_with(|| comb.create()), v);
    }
    map
}

/// Merge a group of per-key partial maps into one.
fn merge_group<K, V, A, O, C>(group: Vec<HashMap<K, A>>, comb: &C) -> HashMap<K, A>
where
    K: Eq + Hash,
    C: CombineFn<V, A, O>,
{
    let mut out: HashMap<K, A> = HashMap::new();
    for m in group {
        for (k, a) in m {
            match out.entry(k) {
                Entry::Occupied(mut e) => comb.merge(e.get_mut(), a),
                Entry::Vacant(e) => {
                    e.insert(a);
                }
            }
        }
    }
    out
}

fn extract_all<K, V, A, O, C>(accs: HashMap<K, A>, comb: &C) -> Vec<(K, O)>
where
    K: Eq + Hash,
    C: CombineFn<V, A, O>,
{
    accs.into_iter().map(|(k, a)| (k, comb.extract(a))).collect()
}

fn encode_partials<K, A>(map: HashMap<K, A>) -> Result<Vec<(K, Vec<u8>)>>
where
    K: Eq + Hash,
    A: KfBound,
{
    map.into_iter()
        .map(|(k, a)| Ok((k, encode_accumulator(&a)?)))
        .collect()
}

fn decode_partials<K, A>(records: Vec<(K, Vec<u8>)>) -> Result<HashMap<K, A>>
where
    K: Eq + Hash,
    A: KfBound,
{
    records
        .into_iter()
        .map(|(k, bytes)| Ok((k, decode_accumulator::<A>(&bytes)?)))
        .collect()
}

/// Split into up to `n` contiguous shards (last shard may be shorter).
fn split_vec<T>(v: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let len = v.len();
    if n <= 1 || len <= 1 {
        return vec![v];
    }
    let chunk = len.div_ceil(n);
    let mut out = Vec::with_capacity(len.div_ceil(chunk));
    let mut v = v.into_iter();
    loop {
        let c: Vec<T> = v.by_ref().take(chunk).collect();
        if c.is_empty() {
            break;
        }
        out.push(c);
    }
    out
}

/// Split owned items into groups of at most `size`.
fn chunk_owned<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut groups = Vec::with_capacity(items.len().div_ceil(size.max(1)));
    let mut it = items.into_iter();
    loop {
        let g: Vec<T> = it.by_ref().take(size).collect();
        if g.is_empty() {
            break;
        }
        groups.push(g);
    }
    groups
}

use anyhow::Result;
use keyfold::{CombineDriver, Count, ExecMode, MeanF64, MinF64, SumI64};

fn sequential() -> CombineDriver {
    CombineDriver {
        mode: ExecMode::Sequential,
        ..Default::default()
    }
}

fn parallel(partitions: usize) -> CombineDriver {
    CombineDriver {
        mode: ExecMode::Parallel {
            threads: None,
            partitions: Some(partitions),
        },
        ..Default::default()
    }
}

#[test]
fn mean_per_key_of_singletons_is_the_value() -> Result<()> {
    let input = vec![(1u64, 1.5f64), (2u64, 7.3)];

    let mut seq = sequential().combine_per_key(input.clone(), &MeanF64)?;
    seq.sort_by_key(|&(k, _)| k);
    assert_eq!(seq, vec![(1, 1.5), (2, 7.3)]);

    let mut par = parallel(2).combine_per_key(input, &MeanF64)?;
    par.sort_by_key(|&(k, _)| k);
    assert_eq!(par, vec![(1, 1.5), (2, 7.3)]);
    Ok(())
}

#[test]
fn keyed_count_matches_across_modes() -> Result<()> {
    let words: Vec<(String, u64)> = (0..20_000)
        .map(|i| (format!("w{}", i % 137), 1u64))
        .collect();

    let mut direct = sequential().combine_per_key(words.clone(), &Count)?;
    direct.sort();
    let mut sharded = parallel(8).combine_per_key(words, &Count)?;
    sharded.sort();

    assert_eq!(direct.len(), 137);
    assert_eq!(direct.iter().map(|&(_, n)| n).sum::<u64>(), 20_000);
    assert_eq!(direct, sharded);
    Ok(())
}

#[test]
fn shard_shape_never_changes_the_result() -> Result<()> {
    // i64 sums (wrapping included) are exact, so every shard count, shard
    // order, and merge fanout must agree bit-for-bit with the linear scan.
    let input: Vec<(u8, i64)> = [
        0i64,
        1,
        10_000_000_000_000_000,
        -50_000_000_000_000_000,
        70_000_000_000_000_000,
        0,
        10_000_000_000_000_000,
        -1,
        -50_000_000_000_000_000,
        70_000_000_000_000_000,
        33_123_213_121,
        i64::MAX,
        i64::MIN,
    ]
    .iter()
    .enumerate()
    .map(|(i, &v)| ((i % 3) as u8, v))
    .collect();

    let mut baseline = sequential().combine_per_key(input.clone(), &SumI64)?;
    baseline.sort();

    for parts in 1..=8 {
        for fanout in [None, Some(2), Some(3)] {
            let driver = CombineDriver {
                fanout,
                ..parallel(parts)
            };

            let mut out = driver.combine_per_key(input.clone(), &SumI64)?;
            out.sort();
            assert_eq!(out, baseline, "parts={parts} fanout={fanout:?}");

            // Rotated input: same multiset per key, different element order.
            let mut rotated = input.clone();
            rotated.rotate_left(parts);
            let mut out = driver.combine_per_key(rotated, &SumI64)?;
            out.sort();
            assert_eq!(out, baseline, "rotated, parts={parts}");
        }
    }
    Ok(())
}

#[test]
fn explicit_shards_merge_in_any_order() -> Result<()> {
    let shards = vec![
        vec![("a".to_string(), 5i64), ("b".to_string(), 1)],
        vec![("a".to_string(), -2)],
        vec![],
        vec![("b".to_string(), 10), ("a".to_string(), 4)],
    ];
    let mut reversed = shards.clone();
    reversed.reverse();

    let driver = parallel(4);
    let mut fwd = driver.combine_sharded(shards, &SumI64)?;
    fwd.sort();
    let mut rev = driver.combine_sharded(reversed, &SumI64)?;
    rev.sort();

    assert_eq!(fwd, vec![("a".to_string(), 7), ("b".to_string(), 11)]);
    assert_eq!(fwd, rev);
    Ok(())
}

#[test]
fn absent_keys_stay_absent() -> Result<()> {
    // A key with zero elements never enters the protocol; empty shards
    // contribute nothing.
    let out = parallel(4).combine_per_key(Vec::<(String, i64)>::new(), &SumI64)?;
    assert!(out.is_empty());

    let shards: Vec<Vec<(String, f64)>> = vec![vec![], vec![("only".to_string(), 2.5)], vec![]];
    let out = parallel(3).combine_sharded(shards, &MinF64)?;
    assert_eq!(out, vec![("only".to_string(), 2.5)]);
    Ok(())
}

#[test]
fn nan_poisoning_is_shard_independent() -> Result<()> {
    // Wherever the NaN lands, the key it belongs to comes out NaN and other
    // keys are untouched.
    let input = vec![
        ("poisoned".to_string(), 1.0),
        ("clean".to_string(), 3.0),
        ("poisoned".to_string(), f64::NAN),
        ("clean".to_string(), 2.0),
        ("poisoned".to_string(), 0.5),
    ];

    for parts in 1..=5 {
        let mut out = parallel(parts).combine_per_key(input.clone(), &MinF64)?;
        out.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(out[0].0, "clean");
        assert_eq!(out[0].1, 2.0);
        assert_eq!(out[1].0, "poisoned");
        assert!(out[1].1.is_nan());
    }
    Ok(())
}

#[test]
fn global_combine_basics() -> Result<()> {
    let input: Vec<i64> = (0..100).collect(); // sum = 4950

    assert_eq!(sequential().combine_globally(input.clone(), &SumI64)?, 4950);

    // Small fanout exercises multi-round merging.
    let driver = CombineDriver {
        fanout: Some(3),
        ..parallel(32)
    };
    assert_eq!(driver.combine_globally(input, &SumI64)?, 4950);

    // Empty input extracts the identity accumulator.
    assert_eq!(parallel(4).combine_globally(Vec::<i64>::new(), &SumI64)?, 0);
    Ok(())
}

#[test]
fn global_mean_matches_linear_scan() -> Result<()> {
    let input: Vec<f64> = (1..=10).map(f64::from).collect(); // mean = 5.5

    let seq = sequential().combine_globally(input.clone(), &MeanF64)?;
    let par = parallel(4).combine_globally(input, &MeanF64)?;
    assert!((seq - 5.5).abs() < 1e-12);
    assert!((par - 5.5).abs() < 1e-12);
    Ok(())
}

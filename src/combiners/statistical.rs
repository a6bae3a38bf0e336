//! Statistical combiners: Mean per numeric domain.

use crate::combiner::CombineFn;

macro_rules! int_mean_combiner {
    ($ty:ty, $label:ident) => {
        paste::paste! {
            /// Average of values per key as `f64`.
            ///
            /// Accumulator is a `(running sum, count)` pair. The running sum
            /// obeys the same two's-complement wraparound rule as the domain's
            /// Sum combiner; the division always happens in double precision,
            /// never truncating integer division.
            ///
            /// Empty input extracts to `0.0`.
            #[derive(Clone, Copy, Debug, Default)]
            pub struct [<Mean $label>];

            impl CombineFn<$ty, ($ty, u64), f64> for [<Mean $label>] {
                fn create(&self) -> ($ty, u64) {
                    (0, 0)
                }

                fn add_input(&self, acc: &mut ($ty, u64), v: $ty) {
                    acc.0 = acc.0.wrapping_add(v);
                    acc.1 += 1;
                }

                fn merge(&self, acc: &mut ($ty, u64), other: ($ty, u64)) {
                    acc.0 = acc.0.wrapping_add(other.0);
                    acc.1 += other.1;
                }

                #[allow(clippy::cast_precision_loss)]
                fn extract(&self, acc: ($ty, u64)) -> f64 {
                    if acc.1 == 0 {
                        0.0
                    } else {
                        acc.0 as f64 / acc.1 as f64
                    }
                }
            }
        }
    };
}

int_mean_combiner!(i32, I32);
int_mean_combiner!(i64, I64);

/// Average of `f64` values per key.
///
/// Accumulator is a `(running sum, count)` pair; the sum follows IEEE-754
/// addition, so NaN inputs propagate into the mean. Empty input extracts
/// to `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanF64;

impl CombineFn<f64, (f64, u64), f64> for MeanF64 {
    fn create(&self) -> (f64, u64) {
        (0.0, 0)
    }

    fn add_input(&self, acc: &mut (f64, u64), v: f64) {
        acc.0 += v;
        acc.1 += 1;
    }

    fn merge(&self, acc: &mut (f64, u64), other: (f64, u64)) {
        acc.0 += other.0;
        acc.1 += other.1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn extract(&self, acc: (f64, u64)) -> f64 {
        if acc.1 == 0 {
            0.0
        } else {
            acc.0 / acc.1 as f64
        }
    }
}

//! Basic arithmetic combiners: Sum, Min, Max per numeric domain.

use crate::combiner::CombineFn;

/* ===================== integer domains ===================== */

macro_rules! int_basic_combiners {
    ($ty:ty, $label:ident) => {
        paste::paste! {
            /// Sum of values per key, wrapping on overflow.
            ///
            /// Accumulator and output are the domain scalar; identity is 0.
            /// Overflow wraps per two's-complement fixed-width arithmetic: a
            /// declared output type cannot be silently widened, so the total
            /// is bit-identical no matter how the input was sharded.
            #[derive(Clone, Copy, Debug, Default)]
            pub struct [<Sum $label>];

            impl CombineFn<$ty, $ty, $ty> for [<Sum $label>] {
                fn create(&self) -> $ty {
                    0
                }

                fn add_input(&self, acc: &mut $ty, v: $ty) {
                    *acc = acc.wrapping_add(v);
                }

                fn merge(&self, acc: &mut $ty, other: $ty) {
                    *acc = acc.wrapping_add(other);
                }

                fn extract(&self, acc: $ty) -> $ty {
                    acc
                }
            }

            /// Minimum value per key.
            ///
            /// The accumulator starts at the domain maximum, the neutral
            /// element of `min`; it is only ever observed when merging a
            /// partial that saw zero local elements.
            #[derive(Clone, Copy, Debug, Default)]
            pub struct [<Min $label>];

            impl CombineFn<$ty, $ty, $ty> for [<Min $label>] {
                fn create(&self) -> $ty {
                    <$ty>::MAX
                }

                fn add_input(&self, acc: &mut $ty, v: $ty) {
                    if v < *acc {
                        *acc = v;
                    }
                }

                fn merge(&self, acc: &mut $ty, other: $ty) {
                    if other < *acc {
                        *acc = other;
                    }
                }

                fn extract(&self, acc: $ty) -> $ty {
                    acc
                }
            }

            /// Maximum value per key.
            ///
            /// The accumulator starts at the domain minimum, the neutral
            /// element of `max`.
            #[derive(Clone, Copy, Debug, Default)]
            pub struct [<Max $label>];

            impl CombineFn<$ty, $ty, $ty> for [<Max $label>] {
                fn create(&self) -> $ty {
                    <$ty>::MIN
                }

                fn add_input(&self, acc: &mut $ty, v: $ty) {
                    if v > *acc {
                        *acc = v;
                    }
                }

                fn merge(&self, acc: &mut $ty, other: $ty) {
                    if other > *acc {
                        *acc = other;
                    }
                }

                fn extract(&self, acc: $ty) -> $ty {
                    acc
                }
            }
        }
    };
}

int_basic_combiners!(i32, I32);
int_basic_combiners!(i64, I64);

/* ===================== f64 domain ===================== */

// NaN policy for the f64 family: NaN propagates. `f64::min`/`f64::max` would
// silently drop a NaN operand, which makes the result depend on which shard
// the NaN landed in; an explicit check keeps poisoning shard-shape-independent.
fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if b < a {
        b
    } else {
        a
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if b > a {
        b
    } else {
        a
    }
}

/// Sum of `f64` values per key under IEEE-754 addition.
///
/// NaN inputs propagate to the result; large-magnitude sums may lose
/// precision, which is accepted rather than corrected.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumF64;

impl CombineFn<f64, f64, f64> for SumF64 {
    fn create(&self) -> f64 {
        0.0
    }

    fn add_input(&self, acc: &mut f64, v: f64) {
        *acc += v;
    }

    fn merge(&self, acc: &mut f64, other: f64) {
        *acc += other;
    }

    fn extract(&self, acc: f64) -> f64 {
        acc
    }
}

/// Minimum `f64` value per key. NaN propagates; the neutral element is `+inf`
/// so that a zero-element partial never shadows a real value.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinF64;

impl CombineFn<f64, f64, f64> for MinF64 {
    fn create(&self) -> f64 {
        f64::INFINITY
    }

    fn add_input(&self, acc: &mut f64, v: f64) {
        *acc = nan_min(*acc, v);
    }

    fn merge(&self, acc: &mut f64, other: f64) {
        *acc = nan_min(*acc, other);
    }

    fn extract(&self, acc: f64) -> f64 {
        acc
    }
}

/// Maximum `f64` value per key. NaN propagates; the neutral element is `-inf`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxF64;

impl CombineFn<f64, f64, f64> for MaxF64 {
    fn create(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn add_input(&self, acc: &mut f64, v: f64) {
        *acc = nan_max(*acc, v);
    }

    fn merge(&self, acc: &mut f64, other: f64) {
        *acc = nan_max(*acc, other);
    }

    fn extract(&self, acc: f64) -> f64 {
        acc
    }
}

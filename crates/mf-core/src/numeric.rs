use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Force a value's magnitude away from zero to at least `limit`, sign preserved.
///
/// Exact zero is pushed to `+limit`. Used to guard denominators that can
/// legitimately approach zero (molar sums, vanishing flows).
pub fn inner_limit(value: Real, limit: Real) -> Real {
    if value >= 0.0 {
        value.max(limit)
    } else {
        value.min(-limit)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn inner_limit_magnitude_bounded(v in -1e6_f64..1e6_f64) {
            let limited = inner_limit(v, 1e-9);
            prop_assert!(limited.abs() >= 1e-9);
            // Sign is preserved for nonzero inputs
            if v > 0.0 {
                prop_assert!(limited > 0.0);
            } else if v < 0.0 {
                prop_assert!(limited < 0.0);
            }
        }
    }
}

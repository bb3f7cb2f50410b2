use crate::MmError;

/// Floating point type used throughout the system.
pub type Real = f64;

/// Absolute/relative tolerance pair used to decide whether a value changed.
#[derive(Clone, Copy, Debug, PartialEq)]
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

/// Compare two reals under `tol`. Two NaNs compare equal: both are "unknown".
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a == b {
        return true;
    }
    if a.is_infinite() || b.is_infinite() {
        return false;
    }
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, MmError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MmError::NonFinite { what, value: v })
    }
}

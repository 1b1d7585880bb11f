//! Closed-form check of computed dot products.
//!
//! With `a(i, j) = i + 1` and `b(i, j) = j + 1` every result has the closed
//! form `c(i) = (i + 1) * len * (len + 1) / 2`.

use tracing::warn;

/// Upper bound on the squared relative error (relative error `1e-10`).
pub const TOLERANCE_SQ: f64 = 1e-20;

/// Expected `c(i)` for vectors of length `len`.
///
/// Evaluated in `f64` so that `len * (len + 1)` cannot overflow.
pub fn expected_value(i: usize, len: usize) -> f64 {
    1.0 * (i + 1) as f64 * len as f64 * (len as f64 + 1.0) / 2.0
}

/// One index whose computed value is outside tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub computed: f64,
    pub expected: f64,
    /// `(computed - expected) / expected`, or the absolute difference when
    /// `expected` is zero.
    pub rel_diff: f64,
}

impl Mismatch {
    pub fn abs_diff(&self) -> f64 {
        self.computed - self.expected
    }
}

/// Outcome of checking every index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Validation {
    pub num_vectors: usize,
    pub len: usize,
    pub mismatches: Vec<Mismatch>,
}

impl Validation {
    /// Whether any index failed.
    pub fn has_error(&self) -> bool {
        !self.mismatches.is_empty()
    }
}

/// Compare `h_c` against the closed form, collecting every mismatch.
pub fn validate(h_c: &[f64], len: usize) -> Validation {
    let mismatches: Vec<Mismatch> = h_c
        .iter()
        .enumerate()
        .filter_map(|(i, &computed)| {
            let expected = expected_value(i, len);
            let diff = computed - expected;
            let rel_diff = if expected == 0.0 { diff } else { diff / expected };
            // Written so that NaN counts as a failure.
            if rel_diff * rel_diff <= TOLERANCE_SQ {
                None
            } else {
                Some(Mismatch {
                    index: i,
                    computed,
                    expected,
                    rel_diff,
                })
            }
        })
        .collect();

    if !mismatches.is_empty() {
        warn!(
            count = mismatches.len(),
            first = mismatches[0].index,
            "dot products differ from the closed form"
        );
    }

    Validation {
        num_vectors: h_c.len(),
        len,
        mismatches,
    }
}

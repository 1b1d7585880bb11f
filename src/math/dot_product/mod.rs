//! # Array of Dot Products
//!
//! Computes one dot product per vector pair of a batch:
//!
//! `c(i) = Σ_j a(i, j) * b(i, j)`
//!
//! The batch is evaluated as a data-parallel map over `i`, repeated
//! `nrepeat` times to get a stable timing, then checked against the closed
//! form `(i + 1) * len * (len + 1) / 2`.
//!
//! ## Memory layout
//!
//! - **LayoutRight**: each vector is contiguous, so one task streams through
//!   memory. Best for CPU caches.
//! - **LayoutLeft**: element `j` of neighbouring vectors is contiguous, so
//!   neighbouring tasks read neighbouring addresses. Best for coalescing
//!   devices.
//!
//! The layout never changes the results, only the achieved bandwidth.

pub mod bench;
pub mod code;
pub mod report;
#[cfg(test)]
pub mod test;
pub mod validate;

pub use bench::{run_benchmark, run_with_layout, BenchmarkOutcome};
pub use code::*;
pub use report::{write_report, Metrics};
pub use validate::{expected_value, validate, Mismatch, Validation};

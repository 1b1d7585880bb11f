//! Error types for the benchmark harness.

use thiserror::Error;

/// Errors produced while configuring or running the benchmark.
///
/// Numerical mismatches are not errors: they are collected by the validator
/// and reported as text.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("memory allocation failed for view '{label}': {bytes} bytes")]
    Allocation { label: String, bytes: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid command line: {0}")]
    Cli(String),

    #[error("extent mismatch copying into '{dst}' ({dst_len} elements) from '{src}' ({src_len} elements)")]
    ShapeMismatch {
        dst: String,
        dst_len: usize,
        src: String,
        src_len: usize,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;

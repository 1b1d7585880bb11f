//! # Array-Dots
//!
//! A memory-bandwidth benchmark that computes a batch of independent dot
//! products over layout-parameterized views, times repeated kernel passes,
//! and checks every result against a closed form.

pub mod config;
pub mod error;
pub mod math;
pub mod runtime;
pub mod utils;
pub mod view;

pub use config::{CliArgs, Command, RunConfig};
pub use error::{BenchError, Result};
pub use runtime::{Runtime, RuntimeConfig};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::config::{CliArgs, Command, RunConfig};
    pub use crate::error::{BenchError, Result};
    pub use crate::math::dot_product::{
        run_benchmark, run_with_layout, BenchmarkOutcome, DotProductFunctor, VectorBatch,
    };
    pub use crate::runtime::{Runtime, RuntimeConfig};
    pub use crate::view::{
        deep_copy, DefaultLayout, DeviceSpace, HostSpace, Layout, LayoutKind, LayoutLeft,
        LayoutRight, View1D, View2D,
    };
}

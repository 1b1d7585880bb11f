//! Timed benchmark harness for the array of dot products.
//!
//! allocate → initialize → `nrepeat` timed kernel passes → copy `C` to the
//! host → validate.

use std::io::Write;

use tracing::{debug, info};

use super::code::VectorBatch;
use super::report::{write_report, Metrics};
use super::validate::{validate, Validation};
use crate::config::RunConfig;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::utils::timer::{start_timer, time_lapse, timed};
use crate::view::{deep_copy, DeviceSpace, HostSpace, Layout, LayoutKind, LayoutLeft, LayoutRight, View1D};

/// Everything one run produced.
#[derive(Debug)]
pub struct BenchmarkOutcome {
    pub config: RunConfig,
    pub layout: LayoutKind,
    /// Seconds spent in the `nrepeat` kernel passes.
    pub time: f64,
    /// Host copy of the final results.
    pub h_c: View1D<f64, HostSpace>,
    pub validation: Validation,
}

impl BenchmarkOutcome {
    pub fn metrics(&self) -> Metrics {
        Metrics {
            num_vectors: self.config.num_vectors(),
            len: self.config.len(),
            nrepeat: self.config.nrepeat(),
            time: self.time,
        }
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write_report(out, &self.metrics(), &self.validation)
    }
}

/// Run the benchmark with 2D views stored under layout `L`.
pub fn run_benchmark<L: Layout>(runtime: &Runtime, config: &RunConfig) -> Result<BenchmarkOutcome> {
    let num_vectors = config.num_vectors();
    let len = config.len();
    let nrepeat = config.nrepeat();

    info!(
        num_vectors,
        len,
        nrepeat,
        layout = L::NAME,
        threads = runtime.num_threads(),
        "starting array of dot products"
    );

    let mut batch: VectorBatch<L, DeviceSpace> = VectorBatch::new(num_vectors, len)?;
    let mut c: View1D<f64, DeviceSpace> = View1D::new("C", num_vectors)?;
    let mut h_c = c.create_mirror_view()?;

    let ((), init_time) = timed(|| runtime.install(|| batch.initialize(&mut c)));
    debug!(seconds = init_time, "initialization finished");

    let start = start_timer();
    runtime.install(|| {
        let functor = batch.functor();
        for _ in 0..nrepeat {
            functor.run(&mut c);
        }
    });
    let time = time_lapse(start);
    info!(seconds = time, nrepeat, "timed region finished");

    let (copied, copy_time) = timed(|| deep_copy(&mut h_c, &c));
    copied?;
    debug!(seconds = copy_time, "copied results to host");

    let validation = validate(h_c.as_slice(), len);

    Ok(BenchmarkOutcome {
        config: *config,
        layout: L::KIND,
        time,
        h_c,
        validation,
    })
}

/// Pick the monomorphization for a configuration-time layout choice.
pub fn run_with_layout(runtime: &Runtime, config: &RunConfig, layout: LayoutKind) -> Result<BenchmarkOutcome> {
    match layout {
        LayoutKind::Right => run_benchmark::<LayoutRight>(runtime, config),
        LayoutKind::Left => run_benchmark::<LayoutLeft>(runtime, config),
    }
}

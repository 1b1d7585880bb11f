//! Parallel execution runtime.
//!
//! [`Runtime`] owns the worker pool that executes every data-parallel map.
//! Creating it is the process-wide initialization step and dropping it is
//! the finalization step; views and kernels are only used while one is
//! alive.

use std::cell::RefCell;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::utils::cpu_affinity::{self, CpuPinGuard};

thread_local! {
    /// Pin held by a bound worker for its whole lifetime.
    static WORKER_PIN: RefCell<Option<CpuPinGuard>> = const { RefCell::new(None) };
}

/// Configuration for [`Runtime::initialize`].
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Number of worker threads. `0` uses every available core.
    pub num_threads: usize,
    /// Bind workers round-robin to the cores in the process affinity mask.
    pub bind: bool,
    /// Prefix for worker thread names.
    pub name_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            bind: false,
            name_prefix: "array-dots".to_string(),
        }
    }
}

/// The initialized parallel runtime.
pub struct Runtime {
    pool: rayon::ThreadPool,
}

impl Runtime {
    /// Start the worker pool.
    pub fn initialize(config: RuntimeConfig) -> Result<Self> {
        let prefix = config.name_prefix.clone();
        let bind_cores = if config.bind {
            cpu_affinity::allowed_cores().unwrap_or_default()
        } else {
            Vec::new()
        };
        let bind = config.bind;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(move |idx| format!("{prefix}-{idx}"))
            .start_handler(move |idx| {
                if !bind {
                    return;
                }
                let Some(core) = cpu_affinity::core_for_worker(idx, &bind_cores) else {
                    warn!(worker = idx, "no allowed cores to bind to");
                    return;
                };
                let guard = CpuPinGuard::with_core(core);
                if guard.is_pinned() {
                    debug!(worker = idx, core, "worker bound");
                } else {
                    warn!(worker = idx, core, "could not bind worker to core");
                }
                WORKER_PIN.with(|pin| *pin.borrow_mut() = Some(guard));
            })
            .exit_handler(|_idx| {
                // Dropping the guard restores the worker's original mask.
                WORKER_PIN.with(|pin| pin.borrow_mut().take());
            })
            .build()?;

        info!(
            threads = pool.current_num_threads(),
            bind = config.bind,
            "runtime initialized"
        );
        Ok(Self { pool })
    }

    /// Number of worker threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the worker pool; parallel iterators used by `op`
    /// execute on this runtime's workers. Returns once all of them finish.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        info!(threads = self.pool.current_num_threads(), "runtime finalized");
    }
}

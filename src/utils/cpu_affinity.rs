//! CPU affinity for worker threads.
//!
//! Linux uses `sched_setaffinity` through libc and remembers each thread's
//! original mask so it can be restored. Other platforms report pinning as
//! unsupported and leave scheduling to the OS.

// ============================================================================
// Linux implementation using libc
// ============================================================================

#[cfg(target_os = "linux")]
mod platform {
    use std::cell::RefCell;

    thread_local! {
        static ORIGINAL_AFFINITY: RefCell<Option<libc::cpu_set_t>> = const { RefCell::new(None) };
    }

    /// Cores in the calling thread's current affinity mask.
    pub fn allowed_cores() -> Option<Vec<usize>> {
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            if libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set) != 0 {
                return None;
            }
            let cores: Vec<usize> = (0..libc::CPU_SETSIZE as usize)
                .filter(|&cpu| libc::CPU_ISSET(cpu, &set))
                .collect();
            if cores.is_empty() {
                None
            } else {
                Some(cores)
            }
        }
    }

    /// Save the current mask unless one is already saved for this thread.
    pub fn save_affinity() -> bool {
        ORIGINAL_AFFINITY.with(|cell| {
            if cell.borrow().is_some() {
                return true;
            }
            unsafe {
                let mut set: libc::cpu_set_t = std::mem::zeroed();
                if libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set)
                    == 0
                {
                    *cell.borrow_mut() = Some(set);
                    true
                } else {
                    false
                }
            }
        })
    }

    pub fn set_affinity(core_id: usize) -> bool {
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core_id, &mut set);
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0
        }
    }

    pub fn restore_affinity() -> bool {
        ORIGINAL_AFFINITY.with(|cell| match cell.borrow_mut().take() {
            Some(set) => unsafe {
                libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0
            },
            None => false,
        })
    }
}

// ============================================================================
// Fallback: no affinity control
// ============================================================================

#[cfg(not(target_os = "linux"))]
mod platform {
    pub fn allowed_cores() -> Option<Vec<usize>> {
        let n = std::thread::available_parallelism().ok()?.get();
        Some((0..n).collect())
    }

    pub fn save_affinity() -> bool {
        true
    }

    pub fn set_affinity(_core_id: usize) -> bool {
        false
    }

    pub fn restore_affinity() -> bool {
        false
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Cores this process may run on, in ascending order.
///
/// Reflects the inherited affinity mask (cpusets, `taskset`), not just the
/// number of online CPUs.
pub fn allowed_cores() -> Option<Vec<usize>> {
    platform::allowed_cores()
}

/// Pin the calling thread to `core_id`, remembering its previous mask.
///
/// Returns `false` when the platform does not support pinning or the call
/// was refused.
pub fn pin_to_core(core_id: usize) -> bool {
    platform::save_affinity() && platform::set_affinity(core_id)
}

/// Restore the mask saved by the last successful [`pin_to_core`].
pub fn unpin() -> bool {
    platform::restore_affinity()
}

/// Core assigned to worker `worker_index` when workers are bound
/// round-robin over `allowed`.
pub fn core_for_worker(worker_index: usize, allowed: &[usize]) -> Option<usize> {
    if allowed.is_empty() {
        None
    } else {
        Some(allowed[worker_index % allowed.len()])
    }
}

// ============================================================================
// RAII Guard
// ============================================================================

/// Pins the calling thread on creation and restores its original mask on
/// drop.
pub struct CpuPinGuard {
    pinned_core: Option<usize>,
}

impl CpuPinGuard {
    /// Pin to `core_id`. Check [`is_pinned`](Self::is_pinned) for success.
    pub fn with_core(core_id: usize) -> Self {
        Self {
            pinned_core: pin_to_core(core_id).then_some(core_id),
        }
    }

    /// Get the core ID this thread is pinned to, if any.
    pub fn core_id(&self) -> Option<usize> {
        self.pinned_core
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_core.is_some()
    }
}

impl Drop for CpuPinGuard {
    fn drop(&mut self) {
        if self.pinned_core.is_some() {
            unpin();
        }
    }
}

//! Utility modules for timing, thread placement and report formatting.

pub mod cpu_affinity;
pub mod format;
pub mod logging;
pub mod timer;

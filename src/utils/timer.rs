//! Wall-clock interval timer.
//!
//! Marks are taken with `gettimeofday` on Unix (microsecond resolution), and
//! elapsed time is reported in seconds as
//! `(end.sec - start.sec) + 1e-6 * (end.usec - start.usec)`.

/// An opaque point in wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeMark {
    secs: i64,
    micros: i64,
}

impl TimeMark {
    /// Capture the current time.
    #[cfg(unix)]
    pub fn now() -> Self {
        // gettimeofday cannot fail with a valid pointer and a null timezone.
        let tv = unsafe {
            let mut tv: libc::timeval = std::mem::zeroed();
            libc::gettimeofday(&mut tv, std::ptr::null_mut());
            tv
        };
        Self {
            secs: tv.tv_sec as i64,
            micros: tv.tv_usec as i64,
        }
    }

    #[cfg(not(unix))]
    pub fn now() -> Self {
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: since_epoch.as_secs() as i64,
            micros: since_epoch.subsec_micros() as i64,
        }
    }

    /// Build a mark from raw components.
    pub const fn from_parts(secs: i64, micros: i64) -> Self {
        Self { secs, micros }
    }

    /// Seconds from `self` to `end`.
    pub fn seconds_until(self, end: TimeMark) -> f64 {
        1.0 * (end.secs - self.secs) as f64 + 1.0e-6 * (end.micros - self.micros) as f64
    }

    /// Seconds elapsed since this mark was taken.
    pub fn elapsed(self) -> f64 {
        self.seconds_until(TimeMark::now())
    }
}

/// Start timing.
pub fn start_timer() -> TimeMark {
    TimeMark::now()
}

/// Seconds since `start`.
pub fn time_lapse(start: TimeMark) -> f64 {
    start.elapsed()
}

/// Run `f` and return its result with the seconds it took.
pub fn timed<R, F: FnOnce() -> R>(f: F) -> (R, f64) {
    let start = start_timer();
    let result = f();
    (result, time_lapse(start))
}

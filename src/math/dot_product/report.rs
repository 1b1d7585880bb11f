//! Result line: problem size, time and bandwidth.
//!
//! ```text
//! #NumVector Length Time(s) ProblemSize(MB) Bandwidth(GB/s)
//! 1000 10000 1.000000e+00 160.000000 1.600000
//! ```
//!
//! Bandwidth counts the bytes of `A` and `B` read per repeat.

use std::io::{self, Write};

use super::validate::Validation;
use crate::utils::format::{fmt_exp, fmt_fixed};

pub const HEADER: &str = "#NumVector Length Time(s) ProblemSize(MB) Bandwidth(GB/s)";

/// Measured quantities for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub num_vectors: usize,
    pub len: usize,
    pub nrepeat: usize,
    /// Seconds spent in the timed region.
    pub time: f64,
}

impl Metrics {
    /// Megabytes in the two input arrays.
    pub fn problem_size_mb(&self) -> f64 {
        1.0e-6 * self.num_vectors as f64 * self.len as f64 * 2.0 * 8.0
    }

    /// GB/s moved across all repeats.
    pub fn bandwidth_gbs(&self) -> f64 {
        1.0e-9 * self.num_vectors as f64 * self.len as f64 * 2.0 * 8.0 * self.nrepeat as f64
            / self.time
    }
}

/// Write mismatch diagnostics followed by either the metrics or `Error`.
pub fn write_report<W: Write>(out: &mut W, metrics: &Metrics, validation: &Validation) -> io::Result<()> {
    for m in &validation.mismatches {
        writeln!(
            out,
            "Error: {} {} {} {} {} {} {}",
            m.index,
            validation.num_vectors,
            validation.len,
            fmt_fixed(m.computed),
            fmt_fixed(m.expected),
            fmt_exp(m.abs_diff()),
            fmt_fixed(m.rel_diff),
        )?;
    }

    if validation.has_error() {
        writeln!(out, "Error")?;
    } else {
        writeln!(out, "{}", HEADER)?;
        writeln!(
            out,
            "{} {} {} {} {}",
            metrics.num_vectors,
            metrics.len,
            fmt_exp(metrics.time),
            fmt_fixed(metrics.problem_size_mb()),
            fmt_fixed(metrics.bandwidth_gbs()),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::dot_product::validate::validate;

    fn render(metrics: &Metrics, validation: &Validation) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, metrics, validation).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_bandwidth_formula() {
        let m = Metrics {
            num_vectors: 1000,
            len: 10000,
            nrepeat: 10,
            time: 1.0,
        };
        assert!((m.problem_size_mb() - 160.0).abs() < 1e-9);
        assert!((m.bandwidth_gbs() - 1.6).abs() < 1e-12);
        let text = render(&m, &Validation::default());
        assert_eq!(
            text,
            format!("{}\n1000 10000 1.000000e+00 160.000000 1.600000\n", HEADER)
        );
    }

    #[test]
    fn test_mismatch_suppresses_metrics() {
        let m = Metrics {
            num_vectors: 2,
            len: 3,
            nrepeat: 1,
            time: 0.5,
        };
        let v = validate(&[6.0, 13.0], 3);
        let text = render(&m, &v);
        assert_eq!(
            text,
            "Error: 1 2 3 13.000000 12.000000 1.000000e+00 0.083333\nError\n"
        );
        assert!(!text.contains("Bandwidth"));
    }

    #[test]
    fn test_error_lines_report_validated_shape() {
        // The diagnostics describe the array that was checked.
        let m = Metrics {
            num_vectors: 99,
            len: 99,
            nrepeat: 1,
            time: 0.5,
        };
        let v = validate(&[4.0, 6.0, 9.0], 2);
        let text = render(&m, &v);
        assert_eq!(
            text,
            "Error: 0 3 2 4.000000 3.000000 1.000000e+00 0.333333\nError\n"
        );
    }
}

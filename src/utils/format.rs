//! printf-compatible number formatting for the report columns.

/// Format like C's `%e`: `d.dddddde±XX`.
pub fn fmt_exp(value: f64) -> String {
    if !value.is_finite() {
        return fmt_non_finite(value);
    }
    let s = format!("{:.6e}", value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s,
    }
}

/// Format like C's `%lf`: six fractional digits.
pub fn fmt_fixed(value: f64) -> String {
    if !value.is_finite() {
        return fmt_non_finite(value);
    }
    format!("{:.6}", value)
}

fn fmt_non_finite(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_sign_negative() {
        "-inf".to_string()
    } else {
        "inf".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_exp_matches_printf() {
        assert_eq!(fmt_exp(1.0), "1.000000e+00");
        assert_eq!(fmt_exp(0.0), "0.000000e+00");
        assert_eq!(fmt_exp(0.0123456789), "1.234568e-02");
        assert_eq!(fmt_exp(-6.0), "-6.000000e+00");
        assert_eq!(fmt_exp(1.5e123), "1.500000e+123");
        assert_eq!(fmt_exp(2.5e-7), "2.500000e-07");
    }

    #[test]
    fn test_fmt_fixed_matches_printf() {
        assert_eq!(fmt_fixed(160.0), "160.000000");
        assert_eq!(fmt_fixed(1.6000000000000003), "1.600000");
        assert_eq!(fmt_fixed(-0.5), "-0.500000");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(fmt_fixed(f64::INFINITY), "inf");
        assert_eq!(fmt_exp(f64::NEG_INFINITY), "-inf");
        assert_eq!(fmt_fixed(f64::NAN), "nan");
    }
}

#![forbid(unsafe_code)]

//! C `printf` renderings of `f64` for the console contract.
//!
//! Rust's `{:e}` writes `1.5e3`; the contract wants `1.500000e+03`.

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some(if value.is_sign_negative() { "-nan" } else { "nan" })
    } else if value.is_infinite() {
        Some(if value < 0.0 { "-inf" } else { "inf" })
    } else {
        None
    }
}

/// Splits Rust's `{:.prec$e}` output into mantissa text and decimal exponent.
fn rust_exp_parts(value: f64, precision: usize) -> (String, i32) {
    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}

fn c_exponent(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{:02}", exponent.unsigned_abs())
}

fn strip_trailing_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// `%.{precision}e`
#[must_use]
pub fn format_exp(value: f64, precision: usize) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_string();
    }
    let (mantissa, exponent) = rust_exp_parts(value, precision);
    format!("{mantissa}e{}", c_exponent(exponent))
}

/// `%.{precision}g` without a field width.
#[must_use]
pub fn format_general(value: f64, precision: usize) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_string();
    }
    let p = precision.max(1);
    // The exponent after rounding to `p` significant digits picks the style.
    let (mantissa, exponent) = rust_exp_parts(value, p - 1);
    let p_i32 = i32::try_from(p).unwrap_or(i32::MAX);
    if exponent < -4 || exponent >= p_i32 {
        return format!("{}e{}", strip_trailing_zeros(&mantissa), c_exponent(exponent));
    }
    let decimals = usize::try_from(p_i32 - 1 - exponent).unwrap_or(0);
    let fixed = format!("{value:.decimals$}");
    strip_trailing_zeros(&fixed).to_string()
}

/// `%{width}.{precision}g`, right-aligned.
#[must_use]
pub fn format_general_width(value: f64, width: usize, precision: usize) -> String {
    format!("{:>width$}", format_general(value, precision))
}

#[cfg(test)]
mod tests {
    use super::{format_exp, format_general, format_general_width};

    #[test]
    fn exp_uses_signed_two_digit_exponent() {
        assert_eq!(format_exp(0.0, 6), "0.000000e+00");
        assert_eq!(format_exp(1.0, 6), "1.000000e+00");
        assert_eq!(format_exp(1e-12, 6), "1.000000e-12");
        assert_eq!(format_exp(12.0, 6), "1.200000e+01");
        assert_eq!(format_exp(-0.00042, 6), "-4.200000e-04");
        assert_eq!(format_exp(6.02e123, 3), "6.020e+123");
    }

    #[test]
    fn exp_spells_non_finite_like_c() {
        assert_eq!(format_exp(f64::INFINITY, 6), "inf");
        assert_eq!(format_exp(f64::NEG_INFINITY, 6), "-inf");
        assert_eq!(format_exp(f64::NAN, 6), "nan");
    }

    #[test]
    fn general_picks_fixed_or_exponent_style() {
        assert_eq!(format_general(0.0, 6), "0");
        assert_eq!(format_general(9.0, 6), "9");
        assert_eq!(format_general(-3.25, 6), "-3.25");
        assert_eq!(format_general(0.5, 6), "0.5");
        assert_eq!(format_general(0.0001, 6), "0.0001");
        assert_eq!(format_general(0.00001, 6), "1e-05");
        assert_eq!(format_general(100_000.0, 6), "100000");
        assert_eq!(format_general(1_000_000.0, 6), "1e+06");
        assert_eq!(format_general(123_456_789.0, 6), "1.23457e+08");
        assert_eq!(format_general(1.0 / 3.0, 6), "0.333333");
        assert_eq!(format_general(999_999.5, 6), "1e+06");
    }

    #[test]
    fn general_width_right_aligns() {
        assert_eq!(format_general_width(9.0, 12, 6), "           9");
        assert_eq!(format_general_width(-1.5, 12, 6), "        -1.5");
        assert_eq!(format_general_width(123_456_789.0, 12, 6), " 1.23457e+08");
    }
}

//! Real-number text formatting.
//!
//! Reals are written with a bounded number of significant digits rather than
//! full round-trip precision, keeping output compact and diffable.

/// Significant digits kept when writing a real.
pub const REAL_SIGNIFICANT_DIGITS: i32 = 7;

/// Upper bound on fractional digits, reached only for tiny magnitudes.
const MAX_FRACTION_DIGITS: i32 = 10;

/// Format a real for output.
///
/// Integral values lose their fraction, trailing zeros are trimmed, `-0`
/// becomes `0`, and non-finite values are written as `0`.
pub fn format_real(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32 + 1;
    let decimals = (REAL_SIGNIFICANT_DIGITS - magnitude).clamp(0, MAX_FRACTION_DIGITS) as usize;
    let mut text = format!("{value:.decimals$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

//! Culture-invariant number text.
//!
//! Integers go through a digit-extraction routine that writes into an
//! exact-width stack buffer back to front. Minimum signed values are emitted
//! from literal constants because their magnitude has no signed negation.

use chrono::TimeDelta;

pub(crate) const I32_MIN_TEXT: &str = "-2147483648";
pub(crate) const I64_MIN_TEXT: &str = "-9223372036854775808";

const THRESHOLDS: [u64; 19] = [
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
    10_000_000_000_000_000_000,
];

fn digit_count(value: u64) -> usize {
    THRESHOLDS
        .iter()
        .position(|&t| value < t)
        .map_or(20, |p| p + 1)
}

fn push_digits(out: &mut String, mut magnitude: u64, negative: bool) {
    let width = digit_count(magnitude) + usize::from(negative);
    let mut buf = [0u8; 21];
    let mut i = width;
    loop {
        i -= 1;
        buf[i] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }
    if negative {
        buf[0] = b'-';
    }
    out.extend(buf[..width].iter().map(|&b| b as char));
}

pub(crate) fn push_i32(out: &mut String, value: i32) {
    if value == i32::MIN {
        out.push_str(I32_MIN_TEXT);
        return;
    }
    if value < 0 {
        push_digits(out, (-value) as u64, true);
    } else {
        push_digits(out, value as u64, false);
    }
}

pub(crate) fn push_i64(out: &mut String, value: i64) {
    if value == i64::MIN {
        out.push_str(I64_MIN_TEXT);
        return;
    }
    if value < 0 {
        push_digits(out, (-value) as u64, true);
    } else {
        push_digits(out, value as u64, false);
    }
}

pub(crate) fn push_u64(out: &mut String, value: u64) {
    push_digits(out, value, false);
}

/// Zero-padded, exactly `digits` wide; higher-order digits beyond the width are dropped.
pub(crate) fn push_fixed_width(out: &mut String, mut value: u32, digits: usize) {
    let mut buf = [b'0'; 10];
    let digits = digits.min(buf.len());
    for i in (0..digits).rev() {
        buf[i] = b'0' + (value % 10) as u8;
        value /= 10;
    }
    out.extend(buf[..digits].iter().map(|&b| b as char));
}

/// Canonical float text:
/// - no exponent notation
/// - no trailing fractional zeros (decimal point dropped if none remain)
/// - -0 normalized to 0
/// - non-finite values as quoted `"NaN"`, `"Infinity"`, `"-Infinity"`
pub(crate) fn format_f64(value: f64) -> String {
    if !value.is_finite() {
        return non_finite(value.is_nan(), value.is_sign_positive());
    }
    if value == 0.0 {
        return String::from("0");
    }
    let mut buf = ryu::Buffer::new();
    let raw = buf.format_finite(value.abs());
    canonical_from_raw(raw, value < 0.0)
}

pub(crate) fn format_f32(value: f32) -> String {
    if !value.is_finite() {
        return non_finite(value.is_nan(), value.is_sign_positive());
    }
    if value == 0.0 {
        return String::from("0");
    }
    let mut buf = ryu::Buffer::new();
    let raw = buf.format_finite(value.abs());
    canonical_from_raw(raw, value < 0.0)
}

fn non_finite(nan: bool, positive: bool) -> String {
    let text = if nan {
        "\"NaN\""
    } else if positive {
        "\"Infinity\""
    } else {
        "\"-Infinity\""
    };
    String::from(text)
}

fn canonical_from_raw(raw: &str, negative: bool) -> String {
    let body = if let Some(exp_index) = raw.find(['e', 'E']) {
        let mantissa = &raw[..exp_index];
        let exp: i32 = raw[exp_index + 1..].parse().unwrap_or(0);
        expand_exponent(mantissa, exp)
    } else {
        String::from(raw)
    };
    let trimmed = trim_fraction(body);
    if trimmed == "0" || !negative {
        return trimmed;
    }
    let mut out = String::with_capacity(trimmed.len() + 1);
    out.push('-');
    out.push_str(&trimmed);
    out
}

fn expand_exponent(mantissa: &str, exp: i32) -> String {
    let mut digits = Vec::with_capacity(mantissa.len());
    let mut point_index = None;
    for &b in mantissa.as_bytes() {
        if b == b'.' {
            point_index = Some(digits.len());
        } else {
            digits.push(b);
        }
    }
    let point_index = point_index.unwrap_or(digits.len());

    let mut result = String::with_capacity(digits.len() + exp.unsigned_abs() as usize + 2);
    if exp >= 0 {
        let target = point_index + exp as usize;
        for (idx, &d) in digits.iter().enumerate() {
            if idx == target {
                result.push('.');
            }
            result.push(d as char);
        }
        for _ in digits.len()..target {
            result.push('0');
        }
    } else {
        let shift = exp.unsigned_abs() as usize;
        if shift >= point_index {
            result.push_str("0.");
            for _ in 0..shift - point_index {
                result.push('0');
            }
            result.extend(digits.iter().map(|&d| d as char));
        } else {
            let split = point_index - shift;
            for (idx, &d) in digits.iter().enumerate() {
                if idx == split {
                    result.push('.');
                }
                result.push(d as char);
            }
        }
    }
    result
}

fn trim_fraction(mut s: String) -> String {
    if let Some(dot_pos) = s.find('.') {
        let mut end = s.len();
        while end > dot_pos + 1 && s.as_bytes()[end - 1] == b'0' {
            end -= 1;
        }
        if end > dot_pos && s.as_bytes()[end - 1] == b'.' {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

/// Interval text `[-][d.]hh:mm:ss[.fffffff]` with 100ns fraction ticks.
pub(crate) fn format_time_span(delta: TimeDelta) -> String {
    let negative = delta < TimeDelta::zero();
    let magnitude = delta.abs();
    let total_secs = magnitude.num_seconds() as u64;
    let ticks = (magnitude.subsec_nanos() / 100) as u32;

    let days = total_secs / 86_400;
    let hours = ((total_secs / 3_600) % 24) as u32;
    let minutes = ((total_secs / 60) % 60) as u32;
    let seconds = (total_secs % 60) as u32;

    let mut out = String::with_capacity(26);
    if negative {
        out.push('-');
    }
    if days > 0 {
        push_u64(&mut out, days);
        out.push('.');
    }
    push_fixed_width(&mut out, hours, 2);
    out.push(':');
    push_fixed_width(&mut out, minutes, 2);
    out.push(':');
    push_fixed_width(&mut out, seconds, 2);
    if ticks > 0 {
        out.push('.');
        push_fixed_width(&mut out, ticks, 7);
    }
    out
}

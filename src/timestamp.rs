//! Conversion between `H:MM:SS(.fff)` offsets and seconds.
//!
//! Parsing is permissive by default: an offset that does not look like a
//! timestamp becomes `NaN`, and `NaN` renders as `NaN:NaN:000NaN`. Callers that
//! would rather reject such documents use [`try_parse_timestamp`].

/// An offset that could not be read as `H:MM:SS` or `H:MM:SS.fff`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed timestamp '{0}' (expected H:MM:SS or H:MM:SS.fff)")]
pub struct TimestampError(pub String);

/// Parses an offset into seconds, rounded to millisecond precision.
///
/// Returns `NaN` when any segment is missing or not numeric.
pub fn parse_timestamp(text: &str) -> f64 {
    try_parse_timestamp(text).unwrap_or(f64::NAN)
}

/// Strict variant of [`parse_timestamp`].
pub fn try_parse_timestamp(text: &str) -> Result<f64, TimestampError> {
    let malformed = || TimestampError(text.to_string());

    let mut segments = text.split(':');
    let (Some(h), Some(m), Some(s), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(malformed());
    };

    let h: u64 = h.trim().parse().map_err(|_| malformed())?;
    let m: u64 = m.trim().parse().map_err(|_| malformed())?;
    let s: f64 = s.trim().parse().map_err(|_| malformed())?;
    if !s.is_finite() || s.is_sign_negative() {
        return Err(malformed());
    }

    let total = h as f64 * 3600.0 + m as f64 * 60.0 + s;
    // millisecond precision, so 0.1 + 0.2 style drift never reaches the output
    Ok((total * 1000.0).round() / 1000.0)
}

/// Renders seconds as `HH:MM:SS.fff`.
///
/// Hours are never wrapped, so recordings longer than 99 hours simply grow a
/// wider hour field. A non-finite value becomes `NaN:NaN:000NaN`: each field
/// reads `NaN`, and the seconds field is still zero-padded to width 6.
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() {
        return format!("NaN:NaN:{:0>6}", "NaN");
    }
    let h = (seconds / 3600.0).floor() as i64;
    let m = ((seconds % 3600.0) / 60.0).floor() as i64;
    let s = seconds % 60.0;
    format!("{h:02}:{m:02}:{s:06.3}")
}

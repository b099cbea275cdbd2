//! Lenient parsers for SMIL clock and repeat values.
//!
//! Per-attribute parse failures are never errors: a malformed timing
//! attribute on one directive must not abort analysis of the whole document,
//! so every parser here returns `None` for anything it does not understand
//! and callers substitute the documented default.

/// The literal sentinel authors use for "forever".
pub(crate) const INDEFINITE: &str = "indefinite";

/// A clock-valued timing attribute after sentinel resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ClockValue {
    /// The literal `indefinite` sentinel.
    Indefinite,
    /// A finite value in milliseconds.
    Millis(f64),
}

/// A `repeatCount` attribute after sentinel resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum RepeatCount {
    /// The literal `indefinite` sentinel.
    Indefinite,
    /// A positive, possibly fractional iteration count.
    Count(f64),
}

/// Parse a SMIL clock string of the shape `<number><unit>`.
///
/// The unit is `ms` or `s`, case-insensitive; the number may be fractional.
/// Returns milliseconds, or `None` for any other shape.
pub fn parse_clock_ms(raw: &str) -> Option<f64> {
    let lower = raw.trim().to_ascii_lowercase();
    let (num, scale) = if let Some(n) = lower.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = lower.strip_suffix('s') {
        (n, 1000.0)
    } else {
        return None;
    };
    let v: f64 = num.trim().parse().ok()?;
    v.is_finite().then_some(v * scale)
}

/// Resolve a clock-valued attribute, treating absent and unparseable alike.
pub(crate) fn parse_timing_attr(raw: Option<&str>) -> Option<ClockValue> {
    let raw = raw?;
    if raw.trim() == INDEFINITE {
        return Some(ClockValue::Indefinite);
    }
    parse_clock_ms(raw).map(ClockValue::Millis)
}

/// Resolve a `repeatCount` attribute.
///
/// Non-positive counts are treated as absent, matching the resolver's
/// default of a single iteration.
pub(crate) fn parse_repeat_count(raw: Option<&str>) -> Option<RepeatCount> {
    let raw = raw?.trim();
    if raw == INDEFINITE {
        return Some(RepeatCount::Indefinite);
    }
    let v: f64 = raw.parse().ok()?;
    (v.is_finite() && v > 0.0).then_some(RepeatCount::Count(v))
}

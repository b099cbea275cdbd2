//! Per-directive timing resolution.

use crate::timing::clock::{ClockValue, RepeatCount, parse_repeat_count, parse_timing_attr};

/// Finite spans beyond one hour are treated as a poor-man's "forever".
///
/// Guards against authoring patterns that use an astronomically large
/// repeat count or duration instead of the `indefinite` sentinel, which
/// would otherwise make every capture absurdly long.
pub(crate) const MAX_FINITE_SPAN_MS: f64 = 3_600_000.0;

/// The five SMIL directive kinds. All share identical timing-attribute
/// semantics; the distinction only matters when rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `<animate>` on an arbitrary attribute.
    Attribute,
    /// `<animateTransform>`.
    Transform,
    /// `<animateMotion>` along a path.
    Motion,
    /// `<set>`, a discrete value switch.
    Set,
    /// `<animateColor>` (deprecated in SVG but still authored).
    Color,
}

impl DirectiveKind {
    /// Map an element name to a directive kind.
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "animate" => Some(Self::Attribute),
            "animateTransform" => Some(Self::Transform),
            "animateMotion" => Some(Self::Motion),
            "set" => Some(Self::Set),
            "animateColor" => Some(Self::Color),
            _ => None,
        }
    }
}

/// Raw timing attributes lifted off one animation element.
///
/// Ephemeral: constructed per analysis pass, never mutated, never persisted.
#[derive(Clone, Copy, Debug)]
pub struct AnimationDirective<'a> {
    /// Which of the five directive elements this came from.
    pub kind: DirectiveKind,
    /// The `dur` attribute, verbatim.
    pub dur: Option<&'a str>,
    /// The `begin` attribute, verbatim.
    pub begin: Option<&'a str>,
    /// The `repeatCount` attribute, verbatim.
    pub repeat_count: Option<&'a str>,
    /// The `repeatDur` attribute, verbatim.
    pub repeat_dur: Option<&'a str>,
}

/// Resolved timing for a single directive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingWindow {
    /// Absolute end of the last iteration in ms. `None` exactly when
    /// the window is infinite.
    pub end_ms: Option<f64>,
    /// The directive never ends on its own.
    pub is_infinite: bool,
    /// Single-iteration duration in ms, present whenever a finite
    /// per-iteration duration was parseable, even inside an infinite window.
    pub base_loop_ms: Option<f64>,
    /// The repeat attribute was literally `indefinite`: the author clearly
    /// intends a seamless loop, as opposed to a merely unbounded window.
    pub is_explicit_forever: bool,
}

impl TimingWindow {
    fn infinite(base_loop_ms: Option<f64>, is_explicit_forever: bool) -> Self {
        Self {
            end_ms: None,
            is_infinite: true,
            base_loop_ms,
            is_explicit_forever,
        }
    }
}

/// Resolve one directive's raw timing attributes into a [`TimingWindow`].
///
/// The rules are ordered; the first matching rule wins:
///
/// 1. `dur="indefinite"` is an infinite window carrying no duration
///    information at all.
/// 2. The base per-iteration duration comes from `dur`, defaulting to 0.
/// 3. An `indefinite` repeat count or repeat duration is an infinite window
///    flagged explicit-forever, with the base duration retained.
/// 4. Otherwise the total span is a finite `repeatDur` when present, else
///    base × repeat count (count defaults to 1).
/// 5. The end time adds the parsed `begin` offset (default 0).
/// 6. Totals beyond [`MAX_FINITE_SPAN_MS`] are reclassified as infinite,
///    not explicit-forever.
pub fn resolve_window(d: &AnimationDirective<'_>) -> TimingWindow {
    let dur = parse_timing_attr(d.dur);
    if matches!(dur, Some(ClockValue::Indefinite)) {
        return TimingWindow::infinite(None, false);
    }
    let base_ms = match dur {
        Some(ClockValue::Millis(v)) => Some(v),
        _ => None,
    };

    let repeat_dur = parse_timing_attr(d.repeat_dur);
    let repeat_count = parse_repeat_count(d.repeat_count);
    if matches!(repeat_count, Some(RepeatCount::Indefinite))
        || matches!(repeat_dur, Some(ClockValue::Indefinite))
    {
        return TimingWindow::infinite(base_ms, true);
    }

    let total_ms = match repeat_dur {
        Some(ClockValue::Millis(v)) => v,
        _ => {
            let count = match repeat_count {
                Some(RepeatCount::Count(c)) => c,
                _ => 1.0,
            };
            base_ms.unwrap_or(0.0) * count
        }
    };
    if total_ms > MAX_FINITE_SPAN_MS {
        return TimingWindow::infinite(base_ms, false);
    }

    let begin_ms = match parse_timing_attr(d.begin) {
        Some(ClockValue::Millis(v)) => v,
        _ => 0.0,
    };
    TimingWindow {
        end_ms: Some(begin_ms + total_ms),
        is_infinite: false,
        base_loop_ms: base_ms,
        is_explicit_forever: false,
    }
}

//! Document-level analysis: dimensions, directive enumeration, reduction.

use usvg::roxmltree::{Document, Node};

use crate::foundation::error::{ReelError, ReelResult};
use crate::timing::directive::{
    AnimationDirective, DirectiveKind, TimingWindow, resolve_window,
};

pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Explicit loops longer than ten minutes are placeholder-like themselves
/// and are filtered out before picking a seamless-loop duration.
pub(crate) const MAX_SANE_LOOP_MS: f64 = 600_000.0;

/// Intrinsic canvas size of the document, in user units.
///
/// Derived once during analysis; both components are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasDimensions {
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
}

impl CanvasDimensions {
    /// Largest pixel size that fits inside `box_w`x`box_h` while preserving
    /// this canvas's aspect ratio. Never returns a zero dimension.
    pub fn fit_within(&self, box_w: u32, box_h: u32) -> (u32, u32) {
        let scale = (f64::from(box_w) / self.width).min(f64::from(box_h) / self.height);
        let w = (self.width * scale).floor().max(1.0) as u32;
        let h = (self.height * scale).floor().max(1.0) as u32;
        (w.min(box_w.max(1)), h.min(box_h.max(1)))
    }
}

/// The analyzer's decision record, consumed by the orchestration layer.
///
/// Invariants: `total_duration_ms` is non-`None` only when
/// `has_animations && !has_infinite_animations`; `loop_duration_ms` is
/// non-`None` only when `has_infinite_animations`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    /// Intrinsic canvas size.
    pub dimensions: CanvasDimensions,
    /// Total duration of one playback pass in ms, when every directive is
    /// finite and at least one ends after t=0.
    pub total_duration_ms: Option<f64>,
    /// The document contains at least one animation directive.
    pub has_animations: bool,
    /// At least one directive never ends on its own.
    pub has_infinite_animations: bool,
    /// Detected seamless-loop duration in ms, when one could be inferred
    /// from infinite directives.
    pub loop_duration_ms: Option<f64>,
}

/// Analyze an SVG document's declarative animation timing.
///
/// A single pass with no retries and no partial-result recovery: either the
/// document yields a complete [`AnalysisResult`], or the structural failure
/// (unparseable markup, non-SVG root, no derivable dimensions) surfaces as a
/// validation error. Individual malformed timing attributes are absorbed
/// silently with defaults substituted.
#[tracing::instrument(skip(svg_text))]
pub fn analyze_svg(svg_text: &str) -> ReelResult<AnalysisResult> {
    let doc = Document::parse(svg_text)
        .map_err(|e| ReelError::validation(format!("failed to parse SVG document: {e}")))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(ReelError::validation(format!(
            "root element is <{}>, expected <svg>",
            root.tag_name().name()
        )));
    }

    let dimensions = extract_dimensions(root)?;
    let windows: Vec<TimingWindow> = collect_directives(root)
        .iter()
        .map(resolve_window)
        .collect();
    tracing::debug!(directives = windows.len(), "resolved timing windows");
    Ok(reduce(dimensions, &windows))
}

/// Read the intrinsic canvas size off the root element.
///
/// Explicit `width`/`height` attributes win; a four-number `viewBox` is the
/// fallback when either is absent or non-numeric.
fn extract_dimensions(root: Node<'_, '_>) -> ReelResult<CanvasDimensions> {
    let explicit = parse_length(root.attribute("width")).zip(parse_length(root.attribute("height")));
    let pair = explicit.or_else(|| view_box_size(root.attribute("viewBox")));
    match pair {
        Some((width, height)) if width > 0.0 && height > 0.0 => {
            Ok(CanvasDimensions { width, height })
        }
        _ => Err(ReelError::validation(
            "document declares no usable canvas size (width/height attributes or viewBox)",
        )),
    }
}

/// Parse a length attribute, stripping a trailing unit suffix (`px`, `pt`,
/// `%`, ...) and keeping the leading numeric prefix.
fn parse_length(raw: Option<&str>) -> Option<f64> {
    let s = raw?
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%')
        .trim_end();
    let v: f64 = s.parse().ok()?;
    v.is_finite().then_some(v)
}

/// Parse `viewBox="minX minY width height"` (space or comma separated) into
/// its width/height components.
fn view_box_size(raw: Option<&str>) -> Option<(f64, f64)> {
    let nums: Vec<f64> = raw?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if nums.len() != 4 {
        return None;
    }
    Some((nums[2], nums[3]))
}

/// Classify a node as one of the five animation directive elements.
pub(crate) fn node_directive_kind(node: Node<'_, '_>) -> Option<DirectiveKind> {
    if !node.is_element() {
        return None;
    }
    let ns = node.tag_name().namespace();
    if !(ns.is_none() || ns == Some(SVG_NS)) {
        return None;
    }
    DirectiveKind::from_tag(node.tag_name().name())
}

/// Enumerate every animation directive anywhere in the document tree.
fn collect_directives<'a>(root: Node<'a, 'a>) -> Vec<AnimationDirective<'a>> {
    root.descendants()
        .filter_map(|n| {
            let kind = node_directive_kind(n)?;
            Some(AnimationDirective {
                kind,
                dur: n.attribute("dur"),
                begin: n.attribute("begin"),
                repeat_count: n.attribute("repeatCount"),
                repeat_dur: n.attribute("repeatDur"),
            })
        })
        .collect()
}

/// Reduce all timing windows to the analyzer's single decision value.
fn reduce(dimensions: CanvasDimensions, windows: &[TimingWindow]) -> AnalysisResult {
    let has_animations = !windows.is_empty();
    let has_infinite = windows.iter().any(|w| w.is_infinite);

    if !has_infinite {
        let max_end = windows.iter().filter_map(|w| w.end_ms).fold(0.0_f64, f64::max);
        return AnalysisResult {
            dimensions,
            total_duration_ms: (max_end > 0.0).then_some(max_end),
            has_animations,
            has_infinite_animations: false,
            loop_duration_ms: None,
        };
    }

    let explicit: Vec<f64> = windows
        .iter()
        .filter(|w| w.is_explicit_forever)
        .filter_map(|w| w.base_loop_ms)
        .collect();

    let loop_duration_ms = if !explicit.is_empty() {
        let survivors: Vec<f64> = explicit
            .iter()
            .copied()
            .filter(|&d| d <= MAX_SANE_LOOP_MS)
            .collect();
        if survivors.is_empty() {
            // Every explicit loop exceeds the ceiling; pick the least absurd.
            explicit.iter().copied().reduce(f64::min)
        } else {
            // The longest surviving cycle, so one capture contains a full
            // cycle of every synchronized loop.
            survivors.iter().copied().reduce(f64::max)
        }
    } else {
        windows
            .iter()
            .filter(|w| w.is_infinite)
            .filter_map(|w| w.base_loop_ms)
            .reduce(f64::max)
    };

    AnalysisResult {
        dimensions,
        total_duration_ms: None,
        has_animations,
        has_infinite_animations: true,
        loop_duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> CanvasDimensions {
        CanvasDimensions {
            width: 100.0,
            height: 50.0,
        }
    }

    fn finite(end_ms: f64, base_loop_ms: Option<f64>) -> TimingWindow {
        TimingWindow {
            end_ms: Some(end_ms),
            is_infinite: false,
            base_loop_ms,
            is_explicit_forever: false,
        }
    }

    fn infinite(base_loop_ms: Option<f64>, explicit: bool) -> TimingWindow {
        TimingWindow {
            end_ms: None,
            is_infinite: true,
            base_loop_ms,
            is_explicit_forever: explicit,
        }
    }

    #[test]
    fn finite_reduction_takes_the_maximum_end_time() {
        let r = reduce(dims(), &[finite(6000.0, Some(2000.0)), finite(2000.0, Some(1000.0))]);
        assert_eq!(r.total_duration_ms, Some(6000.0));
        assert!(r.has_animations && !r.has_infinite_animations);
        assert_eq!(r.loop_duration_ms, None);
    }

    #[test]
    fn zero_maximum_means_unknown_total() {
        let r = reduce(dims(), &[finite(0.0, None)]);
        assert_eq!(r.total_duration_ms, None);
        assert!(r.has_animations);
    }

    #[test]
    fn no_directives_means_no_animations() {
        let r = reduce(dims(), &[]);
        assert!(!r.has_animations);
        assert_eq!(r.total_duration_ms, None);
        assert_eq!(r.loop_duration_ms, None);
    }

    #[test]
    fn any_infinite_window_forces_total_to_unknown() {
        let r = reduce(dims(), &[finite(9000.0, Some(9000.0)), infinite(Some(3000.0), true)]);
        assert_eq!(r.total_duration_ms, None);
        assert!(r.has_infinite_animations);
        assert_eq!(r.loop_duration_ms, Some(3000.0));
    }

    #[test]
    fn placeholder_explicit_loops_are_filtered_before_the_max() {
        // 44444s exceeds the ten-minute ceiling; the 5s loop survives.
        let r = reduce(
            dims(),
            &[infinite(Some(5000.0), true), infinite(Some(44_444_000.0), true)],
        );
        assert_eq!(r.loop_duration_ms, Some(5000.0));
    }

    #[test]
    fn synchronized_explicit_loops_pick_the_longest_survivor() {
        let r = reduce(
            dims(),
            &[infinite(Some(5000.0), true), infinite(Some(8000.0), true)],
        );
        assert_eq!(r.loop_duration_ms, Some(8000.0));
    }

    #[test]
    fn all_placeholder_explicit_loops_fall_back_to_the_minimum() {
        let r = reduce(
            dims(),
            &[infinite(Some(700_000.0), true), infinite(Some(900_000.0), true)],
        );
        assert_eq!(r.loop_duration_ms, Some(700_000.0));
    }

    #[test]
    fn non_explicit_infinite_windows_use_the_max_base_duration() {
        let r = reduce(
            dims(),
            &[infinite(Some(1000.0), false), infinite(Some(2500.0), false)],
        );
        assert_eq!(r.loop_duration_ms, Some(2500.0));
    }

    #[test]
    fn no_base_durations_anywhere_leaves_loop_unknown() {
        let r = reduce(dims(), &[infinite(None, false)]);
        assert!(r.has_infinite_animations);
        assert_eq!(r.loop_duration_ms, None);
    }

    #[test]
    fn length_parsing_strips_unit_suffixes() {
        assert_eq!(parse_length(Some("100px")), Some(100.0));
        assert_eq!(parse_length(Some("72.5pt")), Some(72.5));
        assert_eq!(parse_length(Some("50%")), Some(50.0));
        assert_eq!(parse_length(Some("auto")), None);
        assert_eq!(parse_length(None), None);
    }

    #[test]
    fn view_box_accepts_spaces_and_commas() {
        assert_eq!(view_box_size(Some("0 0 320 240")), Some((320.0, 240.0)));
        assert_eq!(view_box_size(Some("0,0,320,240")), Some((320.0, 240.0)));
        assert_eq!(view_box_size(Some("0 0 320")), None);
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let d = CanvasDimensions {
            width: 200.0,
            height: 100.0,
        };
        assert_eq!(d.fit_within(400, 400), (400, 200));
        assert_eq!(d.fit_within(100, 100), (100, 50));
        assert_eq!(d.fit_within(1, 1), (1, 1));
    }
}

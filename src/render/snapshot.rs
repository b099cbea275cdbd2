//! Static snapshot resolution for SMIL-animated documents.
//!
//! For a frame timestamp `t`, every active animation directive is resolved
//! to a concrete presentation attribute value and the document is
//! re-serialized with those values substituted and the animation elements
//! dropped. The result is a plain static SVG the rasterizer understands.
//!
//! Directive activity windows reuse the timing analyzer's resolution rules,
//! so the rendered motion always agrees with the inferred capture length.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;

use kurbo::{ParamCurve, ParamCurveArclen};
use usvg::roxmltree::{Document, Node, NodeId};

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{lerp_f64, lerp_u8};
use crate::timing::analyze::node_directive_kind;
use crate::timing::clock::{ClockValue, parse_timing_attr};
use crate::timing::directive::{AnimationDirective, DirectiveKind, resolve_window};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Arc-length accuracy for motion paths, in user units.
const MOTION_ACCURACY: f64 = 0.1;

/// Resolves SMIL directives against a parsed document and produces static
/// per-frame snapshots of it.
pub struct Snapshotter<'input> {
    doc: Document<'input>,
    tracks: Vec<Track>,
}

struct Track {
    target: NodeId,
    begin_ms: f64,
    /// Simple (per-iteration) duration. Infinite for a `set` with no `dur`.
    dur_ms: f64,
    /// Active span from `begin`; infinite for unbounded repeats.
    active_ms: f64,
    freeze: bool,
    kind: TrackKind,
}

enum TrackKind {
    Attribute {
        attr: String,
        values: Vec<String>,
    },
    Transform {
        ty: String,
        additive: bool,
        values: Vec<Vec<f64>>,
    },
    Motion {
        segs: Vec<kurbo::PathSeg>,
        lens: Vec<f64>,
        total_len: f64,
    },
    Discrete {
        attr: String,
        to: String,
    },
}

impl Track {
    /// Normalized progress through the current iteration at `t_ms`, or
    /// `None` while the track contributes nothing (before `begin`, or after
    /// a non-freezing window has expired).
    fn progress(&self, t_ms: f64) -> Option<f64> {
        let local = t_ms - self.begin_ms;
        if local < 0.0 {
            return None;
        }
        if local >= self.active_ms {
            if !self.freeze {
                return None;
            }
            if !self.dur_ms.is_finite() || self.dur_ms <= 0.0 {
                return Some(1.0);
            }
            // Frozen at wherever the final (possibly fractional) iteration stopped.
            let frac = (self.active_ms / self.dur_ms).fract();
            return Some(if frac == 0.0 { 1.0 } else { frac });
        }
        if !self.dur_ms.is_finite() || self.dur_ms <= 0.0 {
            return Some(0.0);
        }
        Some((local % self.dur_ms) / self.dur_ms)
    }

    fn is_active(&self, t_ms: f64) -> bool {
        self.progress(t_ms).is_some()
    }
}

#[derive(Default)]
struct TransformAccum {
    replace: Option<String>,
    additive: Vec<String>,
}

impl TransformAccum {
    fn resolve(self, base: Option<&str>) -> String {
        let mut parts: Vec<String> = Vec::new();
        match self.replace {
            Some(r) => parts.push(r),
            None => {
                if let Some(b) = base {
                    parts.push(b.to_string());
                }
            }
        }
        parts.extend(self.additive);
        parts.join(" ")
    }
}

impl<'input> Snapshotter<'input> {
    /// Parse the document and extract every renderable animation track.
    ///
    /// Directives the renderer cannot evaluate (no finite simple duration,
    /// unresolvable target, unparseable values) are skipped silently, in
    /// line with the analyzer's lenient per-directive policy.
    pub fn new(svg_text: &'input str) -> ReelResult<Self> {
        let doc = Document::parse(svg_text)
            .map_err(|e| ReelError::validation(format!("failed to parse SVG document: {e}")))?;
        if doc.root_element().tag_name().name() != "svg" {
            return Err(ReelError::validation("root element is not <svg>"));
        }
        let tracks = build_tracks(&doc);
        Ok(Self { doc, tracks })
    }

    /// Number of animation tracks the renderer will evaluate.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Produce the static SVG snapshot of the document at `t_ms`.
    pub fn snapshot(&self, t_ms: f64) -> String {
        let mut attrs: HashMap<NodeId, BTreeMap<String, String>> = HashMap::new();
        let mut xforms: HashMap<NodeId, TransformAccum> = HashMap::new();

        for track in &self.tracks {
            match &track.kind {
                TrackKind::Discrete { attr, to } => {
                    if track.is_active(t_ms) {
                        attrs
                            .entry(track.target)
                            .or_default()
                            .insert(attr.clone(), to.clone());
                    }
                }
                TrackKind::Attribute { attr, values } => {
                    if let Some(p) = track.progress(t_ms)
                        && let Some(v) = interpolate_values(values, p)
                    {
                        attrs.entry(track.target).or_default().insert(attr.clone(), v);
                    }
                }
                TrackKind::Transform {
                    ty,
                    additive,
                    values,
                } => {
                    if let Some(p) = track.progress(t_ms)
                        && let Some(nums) = interpolate_lists(values, p)
                    {
                        let part = format!("{ty}({})", join_numbers(&nums));
                        let acc = xforms.entry(track.target).or_default();
                        if *additive {
                            acc.additive.push(part);
                        } else {
                            acc.replace = Some(part);
                        }
                    }
                }
                TrackKind::Motion {
                    segs,
                    lens,
                    total_len,
                } => {
                    if let Some(p) = track.progress(t_ms) {
                        let pt = point_at(segs, lens, p * total_len);
                        xforms
                            .entry(track.target)
                            .or_default()
                            .additive
                            .push(format!("translate({} {})", pt.x, pt.y));
                    }
                }
            }
        }

        for (id, acc) in xforms {
            let base = self.doc.get_node(id).and_then(|n| n.attribute("transform"));
            attrs
                .entry(id)
                .or_default()
                .insert("transform".to_string(), acc.resolve(base));
        }

        let mut out = String::with_capacity(self.doc.input_text().len() + 128);
        write_element(self.doc.root_element(), true, &attrs, &mut out);
        out
    }
}

fn build_tracks(doc: &Document<'_>) -> Vec<Track> {
    doc.root_element()
        .descendants()
        .filter_map(|n| {
            let kind = node_directive_kind(n)?;
            build_track(n, kind)
        })
        .collect()
}

fn build_track(n: Node<'_, '_>, kind: DirectiveKind) -> Option<Track> {
    let target = resolve_target(n)?;
    let window = resolve_window(&AnimationDirective {
        kind,
        dur: n.attribute("dur"),
        begin: n.attribute("begin"),
        repeat_count: n.attribute("repeatCount"),
        repeat_dur: n.attribute("repeatDur"),
    });

    let begin_ms = match parse_timing_attr(n.attribute("begin")) {
        Some(ClockValue::Millis(v)) => v,
        _ => 0.0,
    };
    let dur_ms = window.base_loop_ms.filter(|d| *d > 0.0);
    let active_ms = if window.is_infinite {
        f64::INFINITY
    } else {
        window.end_ms.unwrap_or(begin_ms) - begin_ms
    };
    let freeze = n.attribute("fill") == Some("freeze");

    let track = |dur_ms: f64, active_ms: f64, kind: TrackKind| Track {
        target: target.id(),
        begin_ms,
        dur_ms,
        active_ms,
        freeze,
        kind,
    };

    match kind {
        DirectiveKind::Set => {
            let attr = n.attribute("attributeName")?.to_string();
            let to = n.attribute("to")?.to_string();
            // A `set` with no simple duration at all stays applied forever.
            let unbounded = n.attribute("dur").is_none()
                && n.attribute("repeatDur").is_none()
                && n.attribute("repeatCount").is_none();
            let active = if unbounded { f64::INFINITY } else { active_ms };
            Some(track(
                dur_ms.unwrap_or(f64::INFINITY),
                active,
                TrackKind::Discrete { attr, to },
            ))
        }
        DirectiveKind::Attribute | DirectiveKind::Color => {
            let attr = n.attribute("attributeName")?.to_string();
            let values = value_list(n, target)?;
            Some(track(dur_ms?, active_ms, TrackKind::Attribute { attr, values }))
        }
        DirectiveKind::Transform => {
            let ty = n.attribute("type").unwrap_or("translate");
            if !matches!(ty, "translate" | "scale" | "rotate" | "skewX" | "skewY") {
                return None;
            }
            let values: Vec<Vec<f64>> = value_list(n, target)?
                .iter()
                .map(|v| number_list(v))
                .collect::<Option<_>>()?;
            let arity = values.first()?.len();
            if arity == 0 || values.iter().any(|v| v.len() != arity) {
                return None;
            }
            let additive = n.attribute("additive") == Some("sum");
            Some(track(
                dur_ms?,
                active_ms,
                TrackKind::Transform {
                    ty: ty.to_string(),
                    additive,
                    values,
                },
            ))
        }
        DirectiveKind::Motion => {
            let d = motion_path_data(n)?;
            let path = kurbo::BezPath::from_svg(&d).ok()?;
            let segs: Vec<kurbo::PathSeg> = path.segments().collect();
            let lens: Vec<f64> = segs.iter().map(|s| s.arclen(MOTION_ACCURACY)).collect();
            let total_len: f64 = lens.iter().sum();
            if !(total_len > 0.0) {
                return None;
            }
            Some(track(
                dur_ms?,
                active_ms,
                TrackKind::Motion {
                    segs,
                    lens,
                    total_len,
                },
            ))
        }
    }
}

/// The element a directive animates: its `href`/`xlink:href` target when
/// present, otherwise its parent.
fn resolve_target<'a, 'i>(n: Node<'a, 'i>) -> Option<Node<'a, 'i>> {
    let href = n
        .attribute("href")
        .or_else(|| n.attribute((XLINK_NS, "href")));
    match href {
        Some(h) => {
            let id = h.strip_prefix('#')?;
            n.document()
                .descendants()
                .find(|e| e.is_element() && e.attribute("id") == Some(id))
        }
        None => n.parent_element(),
    }
}

/// The keyframe value list of a directive: `values` wins, then `from`/`to`,
/// then a to-animation seeded from the target's current value.
fn value_list(n: Node<'_, '_>, target: Node<'_, '_>) -> Option<Vec<String>> {
    if let Some(values) = n.attribute("values") {
        let vals: Vec<String> = values
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        return (!vals.is_empty()).then_some(vals);
    }
    let to = n.attribute("to")?.trim().to_string();
    if let Some(from) = n.attribute("from") {
        return Some(vec![from.trim().to_string(), to]);
    }
    let attr = n.attribute("attributeName")?;
    match target.attribute(attr) {
        Some(base) => Some(vec![base.trim().to_string(), to]),
        None => Some(vec![to]),
    }
}

/// `path` attribute, or the `d` of the element an `<mpath>` child points at.
fn motion_path_data(n: Node<'_, '_>) -> Option<String> {
    if let Some(d) = n.attribute("path") {
        return Some(d.to_string());
    }
    let mpath = n
        .children()
        .find(|c| c.is_element() && c.tag_name().name() == "mpath")?;
    let href = mpath
        .attribute("href")
        .or_else(|| mpath.attribute((XLINK_NS, "href")))?;
    let id = href.strip_prefix('#')?;
    let path_el = n
        .document()
        .descendants()
        .find(|e| e.is_element() && e.attribute("id") == Some(id))?;
    path_el.attribute("d").map(str::to_string)
}

fn number_list(raw: &str) -> Option<Vec<f64>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

fn join_numbers(nums: &[f64]) -> String {
    let mut out = String::new();
    for (i, v) in nums.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{v}");
    }
    out
}

/// Piecewise-linear interpolation across a keyframe value list.
fn interpolate_values(values: &[String], p: f64) -> Option<String> {
    match values {
        [] => None,
        [only] => Some(only.clone()),
        _ => {
            let segs = values.len() - 1;
            let pos = (p.clamp(0.0, 1.0)) * segs as f64;
            let i = (pos.floor() as usize).min(segs - 1);
            let t = pos - i as f64;
            Some(lerp_raw(&values[i], &values[i + 1], t))
        }
    }
}

fn interpolate_lists(values: &[Vec<f64>], p: f64) -> Option<Vec<f64>> {
    match values {
        [] => None,
        [only] => Some(only.clone()),
        _ => {
            let segs = values.len() - 1;
            let pos = (p.clamp(0.0, 1.0)) * segs as f64;
            let i = (pos.floor() as usize).min(segs - 1);
            let t = pos - i as f64;
            Some(
                values[i]
                    .iter()
                    .zip(&values[i + 1])
                    .map(|(a, b)| lerp_f64(*a, *b, t))
                    .collect(),
            )
        }
    }
}

/// Interpolate two raw attribute values: numerically when both parse as
/// numbers, channel-wise for `#hex` colors, and discretely (hold the left
/// value) for anything else.
fn lerp_raw(a: &str, b: &str, t: f64) -> String {
    if let (Ok(x), Ok(y)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        return format!("{}", lerp_f64(x, y, t));
    }
    if let (Some(ca), Some(cb)) = (
        crate::foundation::core::parse_hex_rgb(a),
        crate::foundation::core::parse_hex_rgb(b),
    ) {
        return format!(
            "#{:02x}{:02x}{:02x}",
            lerp_u8(ca[0], cb[0], t),
            lerp_u8(ca[1], cb[1], t),
            lerp_u8(ca[2], cb[2], t)
        );
    }
    if t < 1.0 { a.to_string() } else { b.to_string() }
}

fn point_at(segs: &[kurbo::PathSeg], lens: &[f64], dist: f64) -> kurbo::Point {
    let total: f64 = lens.iter().sum();
    let mut remaining = dist.clamp(0.0, total);
    for (i, (seg, len)) in segs.iter().zip(lens).enumerate() {
        let last = i == segs.len() - 1;
        if remaining <= *len || last {
            let t = if *len > 0.0 {
                seg.inv_arclen(remaining.min(*len), MOTION_ACCURACY)
            } else {
                0.0
            };
            return seg.eval(t);
        }
        remaining -= len;
    }
    kurbo::Point::ZERO
}

fn write_element(
    node: Node<'_, '_>,
    is_root: bool,
    overrides: &HashMap<NodeId, BTreeMap<String, String>>,
    out: &mut String,
) {
    if node_directive_kind(node).is_some() {
        return;
    }
    let tag = qualified_tag(node);
    out.push('<');
    out.push_str(&tag);

    if is_root {
        for ns in node.namespaces() {
            match ns.name() {
                Some(p) => {
                    let _ = write!(out, " xmlns:{p}=\"");
                }
                None => out.push_str(" xmlns=\""),
            }
            push_escaped_attr(ns.uri(), out);
            out.push('"');
        }
    }

    let empty = BTreeMap::new();
    let ov = overrides.get(&node.id()).unwrap_or(&empty);
    let mut consumed: HashSet<&str> = HashSet::new();
    for attr in node.attributes() {
        let value = if attr.namespace().is_none() {
            if let Some(v) = ov.get(attr.name()) {
                consumed.insert(attr.name());
                v.as_str()
            } else {
                attr.value()
            }
        } else {
            attr.value()
        };
        out.push(' ');
        out.push_str(&qualified_attr_name(node, attr.namespace(), attr.name()));
        out.push_str("=\"");
        push_escaped_attr(value, out);
        out.push('"');
    }
    for (k, v) in ov {
        if !consumed.contains(k.as_str()) {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            push_escaped_attr(v, out);
            out.push('"');
        }
    }

    let has_content = node
        .children()
        .any(|c| (c.is_element() && node_directive_kind(c).is_none()) || c.is_text());
    if !has_content {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for c in node.children() {
        if c.is_element() {
            write_element(c, false, overrides, out);
        } else if c.is_text() {
            push_escaped_text(c.text().unwrap_or(""), out);
        }
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn qualified_tag(node: Node<'_, '_>) -> String {
    let name = node.tag_name().name();
    match node
        .tag_name()
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
    {
        Some(p) if !p.is_empty() => format!("{p}:{name}"),
        _ => name.to_string(),
    }
}

fn qualified_attr_name(node: Node<'_, '_>, ns: Option<&str>, name: &str) -> String {
    match ns.and_then(|uri| node.lookup_prefix(uri)) {
        Some(p) if !p.is_empty() => format!("{p}:{name}"),
        _ => name.to_string(),
    }
}

fn push_escaped_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_text(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

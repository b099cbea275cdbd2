use svgreel::{ReelError, analyze_svg, parse_clock_ms};

fn svg(body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512">{body}</svg>"#
    )
}

#[test]
fn dimensions_fall_back_to_view_box() {
    let doc = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 320 240"/>"#;
    let r = analyze_svg(doc).unwrap();
    assert_eq!(r.dimensions.width, 320.0);
    assert_eq!(r.dimensions.height, 240.0);
}

#[test]
fn unit_suffixes_are_stripped_from_explicit_dimensions() {
    let doc = r#"<svg xmlns="http://www.w3.org/2000/svg" width="640px" height="480px"/>"#;
    let r = analyze_svg(doc).unwrap();
    assert_eq!(r.dimensions.width, 640.0);
    assert_eq!(r.dimensions.height, 480.0);
}

#[test]
fn missing_dimensions_fail_validation() {
    let doc = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="4" height="4"/></svg>"#;
    let err = analyze_svg(doc).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)), "got: {err}");
}

#[test]
fn malformed_markup_fails_validation() {
    assert!(matches!(
        analyze_svg("<svg><unclosed"),
        Err(ReelError::Validation(_))
    ));
    assert!(matches!(
        analyze_svg(r#"<html xmlns="x"></html>"#),
        Err(ReelError::Validation(_))
    ));
}

#[test]
fn finite_reduction_is_a_maximum_over_end_times() {
    // A: start=0, 2s x 3 = 6s. B: start=1s, 1s x 1 = 2s.
    let doc = svg(
        r#"<rect><animate attributeName="x" dur="2s" repeatCount="3"/></rect>
           <rect><animate attributeName="y" begin="1s" dur="1s" repeatCount="1"/></rect>"#,
    );
    let r = analyze_svg(&doc).unwrap();
    assert!(r.has_animations);
    assert!(!r.has_infinite_animations);
    assert_eq!(r.total_duration_ms, Some(6000.0));
    assert_eq!(r.loop_duration_ms, None);
}

#[test]
fn explicit_forever_yields_one_loop() {
    let doc = svg(r#"<rect><animate attributeName="x" dur="76s" repeatCount="indefinite"/></rect>"#);
    let r = analyze_svg(&doc).unwrap();
    assert!(r.has_infinite_animations);
    assert_eq!(r.loop_duration_ms, Some(76_000.0));
    assert_eq!(r.total_duration_ms, None);
}

#[test]
fn placeholder_loops_beyond_the_ceiling_are_filtered() {
    let doc = svg(
        r#"<rect><animate attributeName="x" dur="5s" repeatCount="indefinite"/></rect>
           <rect><animate attributeName="y" dur="44444s" repeatCount="indefinite"/></rect>"#,
    );
    let r = analyze_svg(&doc).unwrap();
    assert_eq!(r.loop_duration_ms, Some(5000.0));
}

#[test]
fn all_placeholder_loops_fall_back_to_the_minimum() {
    let doc = svg(
        r#"<rect><animate attributeName="x" dur="700s" repeatCount="indefinite"/></rect>
           <rect><animate attributeName="y" dur="900s" repeatCount="indefinite"/></rect>"#,
    );
    let r = analyze_svg(&doc).unwrap();
    assert_eq!(r.loop_duration_ms, Some(700_000.0));
}

#[test]
fn documents_without_animations_have_nothing_to_infer() {
    let doc = svg(r#"<circle cx="10" cy="10" r="5"/>"#);
    let r = analyze_svg(&doc).unwrap();
    assert!(!r.has_animations);
    assert_eq!(r.total_duration_ms, None);
    assert_eq!(r.loop_duration_ms, None);
}

#[test]
fn degenerate_long_finite_durations_become_infinite() {
    // 1s x 5000 = 5000s, beyond the one-hour ceiling; reclassified infinite
    // with its base duration feeding the non-explicit fallback.
    let doc = svg(r#"<rect><animate attributeName="x" dur="1s" repeatCount="5000"/></rect>"#);
    let r = analyze_svg(&doc).unwrap();
    assert!(r.has_infinite_animations);
    assert_eq!(r.total_duration_ms, None);
    assert_eq!(r.loop_duration_ms, Some(1000.0));
}

#[test]
fn indefinite_dur_alone_gives_no_loop_duration() {
    let doc = svg(r#"<rect><animate attributeName="x" dur="indefinite"/></rect>"#);
    let r = analyze_svg(&doc).unwrap();
    assert!(r.has_infinite_animations);
    assert_eq!(r.loop_duration_ms, None);
}

#[test]
fn repeat_dur_indefinite_counts_as_explicit_forever() {
    let doc = svg(r#"<rect><animate attributeName="x" dur="3s" repeatDur="indefinite"/></rect>"#);
    let r = analyze_svg(&doc).unwrap();
    assert!(r.has_infinite_animations);
    assert_eq!(r.loop_duration_ms, Some(3000.0));
}

#[test]
fn all_five_directive_kinds_are_enumerated() {
    let doc = svg(
        r#"<rect>
             <animate attributeName="x" dur="1s"/>
             <animateTransform attributeName="transform" type="rotate" dur="2s"/>
             <animateMotion path="M 0 0 L 1 1" dur="3s"/>
             <set attributeName="opacity" to="0" dur="4s"/>
             <animateColor attributeName="fill" dur="5s"/>
           </rect>"#,
    );
    let r = analyze_svg(&doc).unwrap();
    assert!(r.has_animations);
    assert_eq!(r.total_duration_ms, Some(5000.0));
}

#[test]
fn malformed_timing_attributes_are_absorbed_silently() {
    let doc = svg(
        r#"<rect><animate attributeName="x" dur="soon" begin="click" repeatCount="many"/></rect>
           <rect><animate attributeName="y" dur="2s"/></rect>"#,
    );
    let r = analyze_svg(&doc).unwrap();
    // The malformed directive contributes a zero-length window; the healthy
    // one decides the total.
    assert_eq!(r.total_duration_ms, Some(2000.0));
}

#[test]
fn clock_strings_round_trip_per_contract() {
    assert_eq!(parse_clock_ms("1.5s"), Some(1500.0));
    assert_eq!(parse_clock_ms("1000ms"), Some(1000.0));
    assert_eq!(parse_clock_ms("abc"), None);
}

#[test]
fn analysis_result_serializes_to_json() {
    let doc = svg(r#"<rect><animate attributeName="x" dur="2s"/></rect>"#);
    let r = analyze_svg(&doc).unwrap();
    let json = serde_json::to_string(&r).unwrap();
    let back: svgreel::AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
}

use std::path::PathBuf;
use std::process::Command;

fn bin_path() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_svgreel")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "svgreel.exe"
            } else {
                "svgreel"
            });
            p
        })
}

const LOOPER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64">
  <rect width="32" height="32" fill="#336699">
    <animate attributeName="x" dur="5s" repeatCount="indefinite"
             values="0; 32; 0"/>
  </rect>
</svg>"##;

#[test]
fn cli_analyze_emits_json() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("looper.svg");
    std::fs::write(&svg_path, LOOPER).unwrap();

    let out = Command::new(bin_path())
        .args(["analyze", "--json", "--in"])
        .arg(&svg_path)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let analysis: svgreel::AnalysisResult =
        serde_json::from_slice(&out.stdout).expect("analyze --json output parses");
    assert!(analysis.has_infinite_animations);
    assert_eq!(analysis.loop_duration_ms, Some(5000.0));
    assert_eq!(analysis.dimensions.width, 64.0);
}

#[test]
fn cli_frame_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("looper.svg");
    let out_path = dir.path().join("frame.png");
    std::fs::write(&svg_path, LOOPER).unwrap();

    let status = Command::new(bin_path())
        .args(["frame", "--time", "1.25", "--in"])
        .arg(&svg_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out_path.exists());

    let img = image::open(&out_path).unwrap();
    assert_eq!((img.width(), img.height()), (64, 64));
}

#[test]
fn cli_analyze_rejects_unusable_documents() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("bad.svg");
    std::fs::write(&svg_path, r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();

    let out = Command::new(bin_path())
        .args(["analyze", "--in"])
        .arg(&svg_path)
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("validation error"), "stderr: {stderr}");
}

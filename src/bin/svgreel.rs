use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use svgreel::{AnalysisResult, ConvertOpts, Fps, Stage};

#[derive(Parser, Debug)]
#[command(name = "svgreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an SVG's animation timing and print the decision record.
    Analyze(AnalyzeArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 clip (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Input SVG document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print the result as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input SVG document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame timestamp in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels (defaults to the intrinsic canvas width).
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (defaults to the intrinsic canvas height).
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input SVG document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Capture frame rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Capture duration in seconds. Overrides any inferred duration, and is
    /// required when the document's timing cannot be inferred.
    #[arg(long)]
    duration: Option<f64>,

    /// Output video width in pixels (defaults to the intrinsic canvas width,
    /// rounded up to even).
    #[arg(long)]
    width: Option<u32>,

    /// Output video height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Background color as `#rgb` or `#rrggbb`, used for alpha flattening
    /// and letterbox padding.
    #[arg(long, default_value = "#ffffff")]
    background: String,

    /// Overwrite the output file if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,

    /// Suppress the progress bar.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Analyze(args) => cmd_analyze(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_svg(path: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read SVG '{}'", path.display()))
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let text = read_svg(&args.in_path)?;
    let analysis = svgreel::analyze_svg(&text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "canvas: {} x {}",
        analysis.dimensions.width, analysis.dimensions.height
    );
    println!("{}", describe_timing(&analysis));
    Ok(())
}

fn describe_timing(analysis: &AnalysisResult) -> String {
    if !analysis.has_animations {
        return "timing: no declarative animations (a manual duration is required)".to_string();
    }
    if analysis.has_infinite_animations {
        return match analysis.loop_duration_ms {
            Some(ms) => format!("timing: infinite, seamless loop of {:.3}s", ms / 1000.0),
            None => {
                "timing: infinite with no inferable loop (a manual duration is required)"
                    .to_string()
            }
        };
    }
    match analysis.total_duration_ms {
        Some(ms) => format!("timing: finite, one pass lasts {:.3}s", ms / 1000.0),
        None => "timing: unknown (a manual duration is required)".to_string(),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if args.time < 0.0 {
        anyhow::bail!("--time must be non-negative");
    }
    let text = read_svg(&args.in_path)?;
    let analysis = svgreel::analyze_svg(&text)?;

    let width = args
        .width
        .unwrap_or_else(|| analysis.dimensions.width.ceil() as u32);
    let height = args
        .height
        .unwrap_or_else(|| analysis.dimensions.height.ceil() as u32);

    let snap = svgreel::Snapshotter::new(&text)?;
    let raster =
        svgreel::SvgRasterizer::new(args.in_path.parent().map(std::path::Path::to_path_buf));
    let frame = raster.rasterize(&snap.snapshot(args.time * 1000.0), width, height)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_alpha(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let fps = Fps::new(args.fps, 1)?;
    if let Some(d) = args.duration
        && !(d > 0.0)
    {
        anyhow::bail!("--duration must be positive");
    }
    let background = svgreel::parse_hex_rgb(&args.background)
        .ok_or_else(|| anyhow::anyhow!("--background must be #rgb or #rrggbb"))?;
    let target = match (args.width, args.height) {
        (Some(w), Some(h)) => Some((w, h)),
        (None, None) => None,
        _ => anyhow::bail!("--width and --height must be given together"),
    };

    let text = read_svg(&args.in_path)?;

    let mut opts = ConvertOpts::new(&args.out, fps);
    opts.target = target;
    opts.duration_ms = args.duration.map(|d| d * 1000.0);
    opts.overwrite = args.overwrite;
    opts.background = background;
    opts.resources_dir = args.in_path.parent().map(std::path::Path::to_path_buf);

    let bar = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message("rendering");
        Some(pb)
    };

    let mut on_progress = |stage: Stage, fraction: f64| {
        if stage == Stage::Render
            && let Some(pb) = bar.as_ref()
        {
            pb.set_position((fraction * 100.0).round() as u64);
        }
    };

    let report = svgreel::convert(&text, &opts, &mut on_progress)?;

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }
    let (w, h) = report.video_size;
    eprintln!(
        "wrote {} ({:.3}s, {} frames, {}x{})",
        args.out.display(),
        report.capture_ms / 1000.0,
        report.frames,
        w,
        h
    );
    Ok(())
}

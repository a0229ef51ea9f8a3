use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use gifslice::{
    FpsMode, GifTool, Magick, Orchestrator, PlanMode, ProgressCallback, ProgressInfo,
    SegmentOptions, SegmentPlan, TrimRange, plan_segments,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  gifslice metadata input.gif --json\n  gifslice split input.gif 2.5,3.5 --out-dir parts\n  gifslice trim input.gif f:10-50\n  gifslice cut input.gif 0-2.5,3.5-4.5 --width 320 --progress\n  gifslice optimize input.gif --width 320 --fps 12 --fps-mode preserve --colors 64\n  gifslice completions zsh > _gifslice";

#[derive(Debug, Parser)]
#[command(
    name = "gifslice",
    version,
    about = "Split, trim, and optimize animated GIFs on a frame-accurate timeline",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Debug, Parser, Clone, Default)]
struct TransformArgs {
    /// Target width in pixels (height follows the aspect ratio).
    #[arg(long)]
    width: Option<u32>,

    /// Target frame rate.
    #[arg(long)]
    fps: Option<f64>,

    /// FPS retiming policy (normalize = equal delays, preserve = keep relative pacing).
    #[arg(long, default_value = "normalize")]
    fps_mode: String,

    /// Reduce the palette to this many colors.
    #[arg(long)]
    colors: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print timeline metadata for a GIF (alias: probe).
    #[command(
        about = "Print GIF timeline metadata",
        visible_alias = "probe",
        visible_alias = "info",
        after_help = "Examples:\n  gifslice metadata input.gif\n  gifslice metadata input.gif --json"
    )]
    Metadata {
        /// Input GIF path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Split a GIF into parts at the given points.
    #[command(
        about = "Split a GIF at time or frame points",
        after_help = "Examples:\n  gifslice split input.gif 2.5,3.5\n  gifslice split input.gif 10,25,40 --frames --out-dir parts"
    )]
    Split {
        /// Input GIF path.
        input: PathBuf,
        /// Comma-separated split points (seconds, or frame numbers with --frames).
        points: String,
        /// Interpret the points as frame numbers.
        #[arg(long)]
        frames: bool,
        /// Directory for the output parts.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Extract one or more sub-ranges, discarding the rest.
    #[command(
        about = "Trim a GIF to one or more ranges",
        after_help = "Examples:\n  gifslice trim input.gif 1.5-3.0\n  gifslice trim input.gif 0-2.5,3.5-4.5\n  gifslice trim input.gif 10-50 --frames"
    )]
    Trim {
        /// Input GIF path.
        input: PathBuf,
        /// Comma-separated start-end ranges (seconds, or frames with --frames).
        ranges: String,
        /// Interpret the ranges as frame numbers.
        #[arg(long)]
        frames: bool,
        /// Directory for the output files.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Split or trim from one free-form expression.
    #[command(
        about = "Split or trim using the shorthand grammar",
        after_help = "Examples:\n  gifslice cut input.gif 2.5,3.5          (split at 2.5s and 3.5s)\n  gifslice cut input.gif 0-2.5,3.5-4.5    (two trims)\n  gifslice cut input.gif f:10-50          (exact frame trim)"
    )]
    Cut {
        /// Input GIF path.
        input: PathBuf,
        /// Shorthand expression: points = split, ranges = trim, `f:`/`frame:` = frame space.
        expr: String,
        /// Directory for the output files.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Optimize a whole GIF without cutting it.
    #[command(
        about = "Resize, retime, or recolor a GIF",
        after_help = "Examples:\n  gifslice optimize input.gif --width 320\n  gifslice optimize input.gif --fps 12 --fps-mode preserve --colors 64 --out small.gif"
    )]
    Optimize {
        /// Input GIF path.
        input: PathBuf,
        /// Output path (default: `<input>_optimized.gif`).
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Report the detected ImageMagick installation.
    Tools,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn parse_fps_mode(value: &str) -> Option<FpsMode> {
    match value.to_ascii_lowercase().as_str() {
        "normalize" | "normalise" | "uniform" => Some(FpsMode::Normalize),
        "preserve" | "proportional" => Some(FpsMode::Preserve),
        _ => None,
    }
}

fn segment_options(transform: &TransformArgs) -> Result<SegmentOptions, Box<dyn std::error::Error>> {
    let mode =
        parse_fps_mode(&transform.fps_mode).ok_or(format!("unsupported --fps-mode: {}", transform.fps_mode))?;
    let mut options = SegmentOptions::new();
    if let Some(width) = transform.width {
        options = options.with_width(width);
    }
    if let Some(fps) = transform.fps {
        options = options.with_fps(fps, mode);
    }
    if let Some(colors) = transform.colors {
        options = options.with_colors(colors);
    }
    Ok(options)
}

fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

fn default_optimize_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| ".gif".to_string());
    input.with_file_name(format!("{stem}_optimized{extension}"))
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !overwrite {
        return Err(format!(
            "output file already exists: {} (use --overwrite)",
            path.display()
        )
        .into());
    }
    Ok(())
}

struct TerminalProgress {
    bar: Option<ProgressBar>,
    verbose: bool,
}

impl TerminalProgress {
    fn new(global: &GlobalOptions, total: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = if global.progress {
            let bar = ProgressBar::new(total);
            let style =
                ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
            bar.set_style(style.progress_chars("##-"));
            Some(bar)
        } else {
            None
        };
        Ok(Self {
            bar,
            verbose: global.verbose,
        })
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message("done");
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
        if self.verbose {
            match &info.output {
                Some(output) => {
                    eprintln!("segment {}/{} -> {}", info.current, info.total, output.display());
                }
                None => eprintln!("segment {}/{} failed", info.current, info.total),
            }
        }
    }
}

fn run_plan(
    global: &GlobalOptions,
    input: &Path,
    text: &str,
    mode: PlanMode,
    out_dir: &Path,
    transform: &TransformArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = segment_options(transform)?;
    let magick = Magick::detect()?;
    let timeline = magick.probe(input)?.timeline();

    let Some(plan) = plan_segments(&timeline, text, mode)? else {
        println!(
            "{} {}",
            "warning:".yellow().bold(),
            "nothing to do — no usable boundaries or ranges".yellow()
        );
        return Ok(());
    };

    let requested = plan.segment_count();
    if global.verbose {
        describe_plan(&plan);
    }

    let progress = TerminalProgress::new(global, requested as u64)?;
    let outputs = Orchestrator::new(&magick)
        .with_progress(&progress)
        .run_segmentation(input, &timeline, &plan, &options, out_dir)?;
    progress.finish();

    for output in &outputs {
        println!("{} {}", "created".green().bold(), output.display());
    }
    if outputs.len() == requested {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!("produced {} of {requested} segment(s)", outputs.len()).green()
        );
    } else {
        println!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("produced {} of {requested} segment(s)", outputs.len()).yellow()
        );
    }
    Ok(())
}

fn describe_plan(plan: &SegmentPlan) {
    match plan {
        SegmentPlan::Split { boundaries } => {
            for (index, window) in boundaries.windows(2).enumerate() {
                eprintln!(
                    "segment {}: {:.2}s-{:.2}s ({:.2}s)",
                    index + 1,
                    window[0],
                    window[1],
                    window[1] - window[0]
                );
            }
        }
        SegmentPlan::Trim { ranges } => {
            for (index, range) in ranges.iter().enumerate() {
                match *range {
                    TrimRange::Time { start, end } => eprintln!(
                        "range {}: {start:.2}s-{end:.2}s ({:.2}s)",
                        index + 1,
                        end - start
                    ),
                    TrimRange::Frames { start, end } => {
                        eprintln!("range {}: frames {start}-{end}", index + 1);
                    }
                }
            }
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Metadata { input, json } => {
            let magick = Magick::detect()?;
            let metadata = magick.probe(&input)?;
            let timeline = metadata.timeline();
            if json {
                let payload = json!({
                    "width": metadata.width,
                    "height": metadata.height,
                    "colors": metadata.colors,
                    "frames": timeline.frame_count(),
                    "fps": timeline.fps(),
                    "avg_delay_cs": timeline.average_delay(),
                    "duration_seconds": timeline.total_duration(),
                    "delays_cs": timeline.delays(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Dimensions: {}x{}", metadata.width, metadata.height);
                println!("Frames:     {}", timeline.frame_count());
                println!("Colors:     {}", metadata.colors);
                println!("Avg delay:  {:.2} cs", timeline.average_delay());
                println!("FPS:        {:.2}", timeline.fps());
                println!("Duration:   {:.2}s", timeline.total_duration());
            }
        }
        Commands::Split {
            input,
            points,
            frames,
            out_dir,
            transform,
        } => {
            let text = if frames { format!("f:{points}") } else { points };
            run_plan(&cli.global, &input, &text, PlanMode::Split, &out_dir, &transform)?;
        }
        Commands::Trim {
            input,
            ranges,
            frames,
            out_dir,
            transform,
        } => {
            let text = if frames { format!("f:{ranges}") } else { ranges };
            run_plan(&cli.global, &input, &text, PlanMode::Trim, &out_dir, &transform)?;
        }
        Commands::Cut {
            input,
            expr,
            out_dir,
            transform,
        } => {
            run_plan(&cli.global, &input, &expr, PlanMode::Auto, &out_dir, &transform)?;
        }
        Commands::Optimize {
            input,
            out,
            transform,
        } => {
            let options = segment_options(&transform)?;
            let output = out.unwrap_or_else(|| default_optimize_output(&input));
            ensure_writable_path(&output, cli.global.overwrite)?;

            let magick = Magick::detect()?;
            let timeline = magick.probe(&input)?.timeline();
            let input_size = fs::metadata(&input)?.len();

            let committed =
                Orchestrator::new(&magick).optimize(&input, &timeline, &options, &output)?;
            let output_size = fs::metadata(&committed)?.len();

            println!("{} {}", "created".green().bold(), committed.display());
            println!(
                "Size: {} -> {}",
                format_file_size(input_size),
                format_file_size(output_size)
            );
            if input_size > 0 {
                let delta = input_size as i64 - output_size as i64;
                let percent = delta as f64 / input_size as f64 * 100.0;
                if delta >= 0 {
                    println!("{}", format!("{percent:.1}% smaller").green());
                } else {
                    println!("{}", format!("{:.1}% larger", percent.abs()).yellow());
                }
            }
        }
        Commands::Tools => {
            let magick = Magick::detect()?;
            println!(
                "{} {} ({})",
                "found:".green().bold(),
                magick.version(),
                magick.command()
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "gifslice", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

//! ImageMagick-backed implementation of [`GifTool`].
//!
//! [`Magick`] locates an installed ImageMagick at construction time
//! (preferring the v7 `magick` entry point, falling back to the v6
//! `convert`/`identify` pair after verifying the fallback really is
//! ImageMagick and not some other `convert` on the PATH) and then drives it
//! through one subprocess per transform.
//!
//! Probing uses `identify -format "%w %h %k %T\n"`, which emits one line
//! per frame: width, height, color count, and delay in centiseconds.
//!
//! # Example
//!
//! ```no_run
//! use gifslice::{GifTool, Magick};
//! use std::path::Path;
//!
//! let magick = Magick::detect()?;
//! println!("using {}", magick.version());
//! let metadata = magick.probe(Path::new("input.gif"))?;
//! println!("{} frames", metadata.frame_count);
//! # Ok::<(), gifslice::GifsliceError>(())
//! ```

use std::path::Path;
use std::process::Command;

use crate::error::GifsliceError;
use crate::metadata::GifMetadata;
use crate::pipeline::{GifTool, TransformOp};

/// Which ImageMagick entry point is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    /// ImageMagick 7+: a single `magick` binary with subcommands.
    Magick7,
    /// ImageMagick 6: separate `convert` and `identify` binaries.
    Convert6,
}

/// A detected ImageMagick installation.
#[derive(Debug, Clone)]
pub struct Magick {
    flavor: Flavor,
    version: String,
}

impl Magick {
    /// Locate an installed ImageMagick.
    ///
    /// Tries `magick -version` first (ImageMagick 7+), then
    /// `convert -version` — the latter only counts if its output mentions
    /// ImageMagick, since other tools also ship a `convert`.
    ///
    /// # Errors
    ///
    /// Returns [`GifsliceError::ToolNotFound`] when neither entry point is
    /// usable.
    pub fn detect() -> Result<Self, GifsliceError> {
        if let Some(version) = version_of("magick") {
            return Ok(Self {
                flavor: Flavor::Magick7,
                version,
            });
        }
        if let Some(version) = version_of("convert")
            && version.contains("ImageMagick")
        {
            return Ok(Self {
                flavor: Flavor::Convert6,
                version,
            });
        }
        Err(GifsliceError::ToolNotFound)
    }

    /// The first line of the tool's `-version` output.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The transform command name (`magick` or `convert`).
    pub fn command(&self) -> &'static str {
        match self.flavor {
            Flavor::Magick7 => "magick",
            Flavor::Convert6 => "convert",
        }
    }

    /// Build the probe invocation for this flavor.
    ///
    /// v7 uses `magick identify`; v6 ships `identify` as its own binary.
    fn identify_command(&self) -> Command {
        match self.flavor {
            Flavor::Magick7 => {
                let mut command = Command::new("magick");
                command.arg("identify");
                command
            }
            Flavor::Convert6 => Command::new("identify"),
        }
    }
}

impl GifTool for Magick {
    fn probe(&self, path: &Path) -> Result<GifMetadata, GifsliceError> {
        let probe_failed = |reason: String| GifsliceError::ProbeFailed {
            path: path.to_path_buf(),
            reason,
        };

        log::debug!("probing {} with {}", path.display(), self.command());
        let output = self
            .identify_command()
            .args(["-format", "%w %h %k %T\n"])
            .arg(path)
            .output()
            .map_err(|error| probe_failed(error.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(probe_failed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().filter(|line| !line.trim().is_empty()).collect();
        let first = lines
            .first()
            .ok_or_else(|| probe_failed("identify produced no frames".to_string()))?;

        let first_fields: Vec<&str> = first.split_whitespace().collect();
        if first_fields.len() < 2 {
            return Err(probe_failed(format!("unparseable identify line {first:?}")));
        }
        let width: u32 = first_fields[0]
            .parse()
            .map_err(|_| probe_failed(format!("bad width in {first:?}")))?;
        let height: u32 = first_fields[1]
            .parse()
            .map_err(|_| probe_failed(format!("bad height in {first:?}")))?;

        // One identify line per frame; color counts fold with max, delays
        // are collected as-is (repair happens at timeline construction).
        let mut colors_per_frame = Vec::new();
        let mut delays = Vec::new();
        for line in &lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if let Some(colors) = fields.get(2).and_then(|f| f.parse::<u32>().ok()) {
                colors_per_frame.push(colors);
            }
            if let Some(delay) = fields.get(3).and_then(|f| f.parse::<u32>().ok()) {
                delays.push(delay);
            }
        }

        Ok(GifMetadata {
            width,
            height,
            colors: colors_per_frame.into_iter().max().unwrap_or(0),
            frame_count: lines.len(),
            delays,
        })
    }

    fn transform(
        &self,
        source: &Path,
        ops: &[TransformOp],
        dest: &Path,
    ) -> Result<(), GifsliceError> {
        let tool = self.command();
        let argv = transform_args(source, ops, dest);
        log::debug!("running {tool} {argv:?}");

        let output = Command::new(tool).args(&argv).output().map_err(|error| {
            GifsliceError::CommandFailed {
                tool: tool.to_string(),
                exit_code: -1,
                message: error.to_string(),
            }
        })?;

        if !output.status.success() {
            return Err(GifsliceError::CommandFailed {
                tool: tool.to_string(),
                exit_code: output.status.code().unwrap_or(-1),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let produced = dest.metadata().map(|m| m.len() > 0).unwrap_or(false);
        if !produced {
            return Err(GifsliceError::MissingOutput {
                path: dest.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Translate an ops list into ImageMagick arguments.
///
/// `ExtractRange` is input syntax rather than a flag: it folds into the
/// source token as `path[start-end]`. The remaining ops become flags in
/// list order, followed by the destination.
pub(crate) fn transform_args(source: &Path, ops: &[TransformOp], dest: &Path) -> Vec<String> {
    let mut input = source.display().to_string();
    for op in ops {
        if let TransformOp::ExtractRange { start, end } = op {
            input.push_str(&format!("[{start}-{end}]"));
        }
    }

    let mut argv = vec![input];
    for op in ops {
        match op {
            TransformOp::Coalesce => argv.push("-coalesce".to_string()),
            TransformOp::ExtractRange { .. } => {}
            TransformOp::ResizeWidth(width) => {
                argv.push("-resize".to_string());
                argv.push(format!("{width}x"));
            }
            TransformOp::SetUniformDelay(delay) => {
                argv.push("-set".to_string());
                argv.push("delay".to_string());
                argv.push(delay.to_string());
            }
            TransformOp::SetColors(colors) => {
                argv.push("-colors".to_string());
                argv.push(colors.to_string());
            }
            TransformOp::OptimizeLayers => {
                argv.push("-layers".to_string());
                argv.push("Optimize".to_string());
            }
        }
    }
    argv.push(dest.display().to_string());
    argv
}

/// Run `<command> -version` and return the first output line on success.
fn version_of(command: &str) -> Option<String> {
    let output = Command::new(command).arg("-version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.lines().next().map(|line| line.trim().to_string())
}

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};

use crate::process::{CommandOutput, run_command};

/// Per-pixel absolute difference of input 0 against input 1.
pub const DIFFERENCE_FILTER: &str = "blend=all_mode=difference";

/// Baseline | rendered | difference, stacked left to right.
pub const COMPARISON_FILTER: &str =
    "[0:v][1:v]blend=all_mode=difference[diff];[0:v][1:v][diff]hstack=inputs=3";

/// Selects every frame from index 0 on; the comma is escaped for the filtergraph parser.
pub const SELECT_FROM_FIRST_FRAME: &str = "select=gte(n\\,0)";

/// Lossless codec for the difference video; a lossy encode can quantize small deltas away.
pub const DIFFERENCE_CODEC: &str = "ffv1";

/// Sequentially numbered still images written by frame extraction.
pub const FRAME_PATTERN: &str = "frame_%05d.png";

/// Handle on the external video tool (`ffmpeg` or a compatible binary).
///
/// Builds the three invocations the pipeline needs. With `verbose` off every invocation is
/// prefixed with `-loglevel error` so only failures reach stderr.
#[derive(Clone, Debug)]
pub struct VideoTool {
    program: PathBuf,
    verbose: bool,
}

impl VideoTool {
    pub fn new(program: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }

    pub fn ffmpeg(verbose: bool) -> Self {
        Self::new("ffmpeg", verbose)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    pub fn run(&self, args: &[OsString]) -> std::io::Result<CommandOutput> {
        run_command(&self.program, args, None)
    }

    fn base_args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(16);
        if !self.verbose {
            args.push("-loglevel".into());
            args.push("error".into());
        }
        args.push("-y".into());
        args
    }

    pub fn difference_args(&self, baseline: &Path, rendered: &Path, out: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        let tail: [OsString; 9] = [
            "-i".into(),
            baseline.into(),
            "-i".into(),
            rendered.into(),
            "-filter_complex".into(),
            DIFFERENCE_FILTER.into(),
            "-c:v".into(),
            DIFFERENCE_CODEC.into(),
            out.into(),
        ];
        args.extend(tail);
        args
    }

    /// Extracts the first `frame_count` frames as PNGs into `dir`, one image per decoded frame
    /// (passthrough timing, no duplication or dropping).
    pub fn extract_frames_args(&self, video: &Path, frame_count: u32, dir: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        let tail: [OsString; 11] = [
            "-i".into(),
            video.into(),
            "-vf".into(),
            SELECT_FROM_FIRST_FRAME.into(),
            "-frames:v".into(),
            frame_count.to_string().into(),
            "-fps_mode".into(),
            "passthrough".into(),
            "-f".into(),
            "image2".into(),
            dir.join(FRAME_PATTERN).into(),
        ];
        args.extend(tail);
        args
    }

    pub fn comparison_args(&self, baseline: &Path, rendered: &Path, out: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        let tail: [OsString; 7] = [
            "-i".into(),
            baseline.into(),
            "-i".into(),
            rendered.into(),
            "-filter_complex".into(),
            COMPARISON_FILTER.into(),
            out.into(),
        ];
        args.extend(tail);
        args
    }
}

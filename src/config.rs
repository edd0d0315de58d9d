use std::path::PathBuf;

use crate::{
    foundation::error::{VrtError, VrtResult},
    video::ffmpeg::VideoTool,
};

pub const DEFAULT_FRAME_COUNT: u32 = 60;
pub const DEFAULT_RESULTS_DIR: &str = "vrt-results";
pub const DEFAULT_VIDEO_TOOL: &str = "ffmpeg";

/// Everything one `baseline` or `test` run needs, fixed before the run starts.
///
/// Relative `scenes`/`baselines` globs resolve against `project_root`; a relative
/// `results_dir` or `report` resolves against the invoking working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VrtConfig {
    pub renderer: PathBuf,
    pub video_tool: PathBuf,
    pub project_root: PathBuf,
    pub scenes: String,
    /// Only used by `test`.
    pub baselines: Option<String>,
    pub results_dir: PathBuf,
    pub frame_count: u32,
    pub verbose: bool,
    pub retain_assets: bool,
    pub report: Option<PathBuf>,
}

impl VrtConfig {
    pub fn new(renderer: impl Into<PathBuf>, scenes: impl Into<String>) -> Self {
        Self {
            renderer: renderer.into(),
            video_tool: PathBuf::from(DEFAULT_VIDEO_TOOL),
            project_root: PathBuf::from("."),
            scenes: scenes.into(),
            baselines: None,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            frame_count: DEFAULT_FRAME_COUNT,
            verbose: false,
            retain_assets: false,
            report: None,
        }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_baselines(mut self, pattern: impl Into<String>) -> Self {
        self.baselines = Some(pattern.into());
        self
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn with_frame_count(mut self, frame_count: u32) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn with_video_tool(mut self, program: impl Into<PathBuf>) -> Self {
        self.video_tool = program.into();
        self
    }

    pub fn video_tool(&self) -> VideoTool {
        VideoTool::new(&self.video_tool, self.verbose)
    }

    pub fn validate(&self) -> VrtResult<()> {
        if self.frame_count < 1 {
            return Err(VrtError::validation("frame count must be at least 1"));
        }
        if self.renderer.as_os_str().is_empty() {
            return Err(VrtError::validation("renderer path must not be empty"));
        }
        if self.scenes.trim().is_empty() {
            return Err(VrtError::validation("scene glob must not be empty"));
        }
        if self.baselines.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return Err(VrtError::validation("baseline glob must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_match_cli_defaults() {
        let cfg = VrtConfig::new("godot", "scenes/*.tscn");
        assert_eq!(cfg.frame_count, 60);
        assert_eq!(cfg.results_dir, PathBuf::from("vrt-results"));
        assert_eq!(cfg.video_tool, PathBuf::from("ffmpeg"));
        assert_eq!(cfg.project_root, PathBuf::from("."));
        cfg.validate().unwrap();
    }

    #[test]
    fn validation_catches_bad_values() {
        assert!(
            VrtConfig::new("godot", "*.tscn")
                .with_frame_count(0)
                .validate()
                .is_err()
        );
        assert!(VrtConfig::new("", "*.tscn").validate().is_err());
        assert!(VrtConfig::new("godot", "  ").validate().is_err());
        assert!(
            VrtConfig::new("godot", "*.tscn")
                .with_baselines("")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn video_tool_follows_verbosity() {
        let mut cfg = VrtConfig::new("godot", "*.tscn").with_video_tool("/opt/ffmpeg");
        cfg.verbose = true;
        let tool = cfg.video_tool();
        assert!(tool.verbose());
        assert_eq!(tool.program(), Path::new("/opt/ffmpeg"));
    }
}

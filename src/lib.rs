//! Visual regression testing for Godot scenes.
//!
//! A scene is rendered to a movie capture, blended against its baseline with a per-pixel
//! difference, and the diff video is sampled: a single uniform colour across every sampled
//! frame means "identical". Scenes that differ get a baseline | rendered | difference review
//! video.
//!
//! - [`run_baseline`] renders scenes to their baseline paths
//! - [`run_test`] renders, diffs and reports per scene
#![forbid(unsafe_code)]

mod foundation;

pub mod config;
pub mod discover;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod scratch;
pub mod validate;
pub mod video;

pub use crate::foundation::error::{VrtError, VrtResult};

pub use crate::config::VrtConfig;
pub use crate::discover::{Scene, discover_scenes, match_baselines};
pub use crate::pipeline::{SceneOutcome, SceneStatus, TestReport, run_baseline, run_test};
pub use crate::process::{CommandOutput, run_command};
pub use crate::render::{RenderedArtifact, SceneJob, render_scene};
pub use crate::scratch::ScratchDir;
pub use crate::validate::validate_environment;
pub use crate::video::{
    compare::compose_comparison,
    diff::{DiffVerdict, has_diff},
    ffmpeg::VideoTool,
    sample::{PixelSample, UniformityReport, UniformityScan, has_uniform_pixel_value},
};

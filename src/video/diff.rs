use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        error::{VrtError, VrtResult},
        paths::{ensure_parent_dir, file_len},
    },
    video::{
        ffmpeg::VideoTool,
        sample::{UniformityReport, has_uniform_pixel_value},
    },
};

/// Outcome of comparing a fresh render against its baseline.
#[derive(Clone, Debug)]
pub struct DiffVerdict {
    pub differs: bool,
    pub diff_video: Option<PathBuf>,
    pub sampling: UniformityReport,
}

/// Blends `baseline` against `rendered` into `diff_out` and samples the first `frame_count`
/// frames of the result.
///
/// A uniform diff video means the sources are pixel-identical over the sampled frames; any
/// other pixel value means they differ.
#[tracing::instrument(skip(tool, rendered, baseline, diff_out), fields(diff = %diff_out.display()))]
pub fn has_diff(
    tool: &VideoTool,
    rendered: &Path,
    baseline: &Path,
    diff_out: &Path,
    frame_count: u32,
) -> VrtResult<DiffVerdict> {
    if frame_count == 0 {
        return Err(VrtError::validation("frame count must be at least 1"));
    }
    ensure_parent_dir(diff_out)?;

    let args = tool.difference_args(baseline, rendered, diff_out);
    let out = tool.run(&args).map_err(|e| {
        VrtError::diff_generation(format!(
            "failed to run '{}': {e}",
            tool.program().display()
        ))
    })?;
    if !out.success() {
        return Err(VrtError::diff_generation(format!(
            "'{}' vs '{}' {}",
            baseline.display(),
            rendered.display(),
            out.failure_summary()
        )));
    }
    match file_len(diff_out) {
        Some(len) if len > 0 => {}
        Some(_) => {
            return Err(VrtError::diff_generation(format!(
                "diff video '{}' is empty",
                diff_out.display()
            )));
        }
        None => {
            return Err(VrtError::diff_generation(format!(
                "diff video '{}' was not written",
                diff_out.display()
            )));
        }
    }

    let sampling = has_uniform_pixel_value(tool, diff_out, frame_count)?;
    tracing::debug!(
        uniform = sampling.uniform,
        frames = sampling.frames_scanned,
        "sampled diff video"
    );
    Ok(DiffVerdict {
        differs: !sampling.uniform,
        diff_video: Some(diff_out.to_path_buf()),
        sampling,
    })
}

use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        error::{VrtError, VrtResult},
        paths::{ensure_parent_dir, file_len, with_stem_suffix},
    },
    video::ffmpeg::VideoTool,
};

/// Where the comparison video for `scene` (project-relative) lands.
///
/// The path is fixed per scene and overwritten on every run, so `results_dir` only ever holds
/// the latest comparison for each failing scene.
pub fn comparison_path(results_dir: &Path, scene: &Path) -> PathBuf {
    results_dir.join(with_stem_suffix(scene, ".avi"))
}

/// Writes a baseline | rendered | difference side-by-side video for human review.
#[tracing::instrument(skip_all, fields(scene = %scene.display()))]
pub fn compose_comparison(
    tool: &VideoTool,
    scene: &Path,
    rendered: &Path,
    baseline: &Path,
    results_dir: &Path,
) -> VrtResult<PathBuf> {
    let out_path = comparison_path(results_dir, scene);
    ensure_parent_dir(&out_path)?;

    let args = tool.comparison_args(baseline, rendered, &out_path);
    let out = tool.run(&args).map_err(|e| {
        VrtError::comparison_generation(format!(
            "failed to run '{}': {e}",
            tool.program().display()
        ))
    })?;
    if !out.success() {
        return Err(VrtError::comparison_generation(format!(
            "'{}' {}",
            out_path.display(),
            out.failure_summary()
        )));
    }
    if file_len(&out_path).unwrap_or(0) == 0 {
        return Err(VrtError::comparison_generation(format!(
            "comparison video '{}' is missing or empty",
            out_path.display()
        )));
    }

    tracing::info!(path = %out_path.display(), "wrote comparison");
    Ok(out_path)
}

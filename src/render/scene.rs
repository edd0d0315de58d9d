use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::{
    foundation::{
        error::{VrtError, VrtResult},
        paths::{absolute, ensure_parent_dir, file_len},
    },
    process::run_command,
};

/// One movie capture of one scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneJob {
    /// Scene path relative to the project root, `/`-separated.
    pub scene: String,
    pub output: PathBuf,
    pub frame_count: u32,
    /// Renderer working directory; scene paths resolve against it.
    pub project_root: PathBuf,
    pub verbose: bool,
}

impl SceneJob {
    pub fn validate(&self) -> VrtResult<()> {
        if self.frame_count < 1 {
            return Err(VrtError::validation(
                "frame count must be at least 1 to render a scene",
            ));
        }
        if self.scene.is_empty() {
            return Err(VrtError::validation("scene path must not be empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(VrtError::validation("render output path must not be empty"));
        }
        Ok(())
    }

    /// `[--verbose] --quit-after <n> --write-movie <out> <scene>`.
    ///
    /// `output` must already be absolute: the renderer runs inside the project root.
    pub fn renderer_args(&self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(6);
        if self.verbose {
            args.push("--verbose".into());
        }
        args.push("--quit-after".into());
        args.push(self.frame_count.to_string().into());
        args.push("--write-movie".into());
        args.push(output.into());
        args.push(self.scene.as_str().into());
        args
    }
}

/// A capture that existed with a non-zero size when it was returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub len: u64,
}

/// Renders `job.scene` with the renderer at `renderer` and verifies the movie was written.
///
/// `job.output` is treated as disposable: any file already there is removed first so a renderer
/// that exits cleanly without writing cannot pass on an old capture. Callers replacing a file
/// they want to keep render to a staging path and move it into place afterwards.
#[tracing::instrument(skip_all, fields(scene = %job.scene))]
pub fn render_scene(renderer: &Path, job: &SceneJob) -> VrtResult<RenderedArtifact> {
    job.validate()?;

    let output = absolute(&job.output)?;
    ensure_parent_dir(&output)?;
    if output.is_file() {
        std::fs::remove_file(&output).map_err(|e| {
            VrtError::render_failed(format!(
                "failed to remove stale capture '{}': {e}",
                output.display()
            ))
        })?;
    }

    let args = job.renderer_args(&output);
    let out = run_command(renderer, &args, Some(&job.project_root)).map_err(|e| {
        VrtError::render_failed(format!("failed to run '{}': {e}", renderer.display()))
    })?;

    if job.verbose {
        for line in out.stdout.lines() {
            tracing::info!(target: "godot_vrt::renderer", "{line}");
        }
        for line in out.stderr.lines() {
            tracing::info!(target: "godot_vrt::renderer", "{line}");
        }
    }

    if !out.success() {
        return Err(VrtError::render_failed(format!(
            "'{}' {}",
            job.scene,
            out.failure_summary()
        )));
    }

    match file_len(&output) {
        Some(len) if len > 0 => {
            tracing::info!(path = %output.display(), bytes = len, "rendered scene");
            Ok(RenderedArtifact { path: output, len })
        }
        _ => Err(VrtError::render_failed(format!(
            "'{}' produced no capture at '{}': {}",
            job.scene,
            output.display(),
            out.stderr.trim()
        ))),
    }
}

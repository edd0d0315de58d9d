use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::{
    config::VrtConfig,
    discover::{Scene, discover_scenes, match_baselines},
    foundation::{
        error::{VrtError, VrtResult},
        paths::{absolute, ensure_parent_dir, with_stem_suffix},
    },
    render::scene::{SceneJob, render_scene},
    scratch::ScratchDir,
    video::{compare::compose_comparison, diff::has_diff},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    Passed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SceneOutcome {
    /// Scene path relative to the project root.
    pub scene: PathBuf,
    pub baseline: PathBuf,
    pub status: SceneStatus,
    /// Side-by-side review video, written only for failed scenes.
    pub comparison: Option<PathBuf>,
    pub frames_requested: u32,
    pub frames_sampled: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TestReport {
    pub scenes: Vec<SceneOutcome>,
}

impl TestReport {
    pub fn has_failures(&self) -> bool {
        self.scenes.iter().any(|s| s.status == SceneStatus::Failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SceneOutcome> {
        self.scenes
            .iter()
            .filter(|s| s.status == SceneStatus::Failed)
    }

    pub fn write_json(&self, path: &Path) -> VrtResult<()> {
        ensure_parent_dir(path)?;
        let f = std::fs::File::create(path)
            .with_context(|| format!("create report '{}'", path.display()))?;
        serde_json::to_writer_pretty(f, self)
            .with_context(|| format!("write report '{}'", path.display()))?;
        Ok(())
    }
}

fn scene_job(cfg: &VrtConfig, scene: &Scene, output: PathBuf) -> SceneJob {
    SceneJob {
        scene: scene.renderer_ref(),
        output,
        frame_count: cfg.frame_count,
        project_root: cfg.project_root.clone(),
        verbose: cfg.verbose,
    }
}

/// Renders every scene matching `cfg.scenes` and stores each capture at its baseline path.
///
/// Scenes are rendered one at a time in discovery order; the first failure aborts the run.
/// Each capture is staged next to its baseline and only moved over it once the render
/// succeeded, so a failed render leaves the accepted baseline untouched.
#[tracing::instrument(skip_all)]
pub fn run_baseline(cfg: &VrtConfig) -> VrtResult<Vec<PathBuf>> {
    cfg.validate()?;
    let scenes = discover_scenes(&cfg.project_root, &cfg.scenes)?;

    let mut written = Vec::with_capacity(scenes.len());
    for scene in &scenes {
        tracing::info!(scene = %scene.renderer_ref(), "rendering baseline");
        let baseline = absolute(&scene.baseline_path())?;
        let staged = stage_next_to(&baseline)?;

        let job = scene_job(cfg, scene, staged.to_path_buf());
        render_scene(&cfg.renderer, &job)?;
        staged
            .persist(&baseline)
            .with_context(|| format!("failed to store baseline '{}'", baseline.display()))?;
        written.push(baseline);
    }
    Ok(written)
}

/// Empty hidden `.avi` file in the directory of `target`, removed on drop unless persisted.
fn stage_next_to(target: &Path) -> VrtResult<tempfile::TempPath> {
    ensure_parent_dir(target)?;
    let dir = target
        .parent()
        .ok_or_else(|| VrtError::validation(format!("'{}' has no parent", target.display())))?;
    let staged = tempfile::Builder::new()
        .prefix(".vrt_baseline_")
        .suffix(".avi")
        .tempfile_in(dir)
        .with_context(|| format!("failed to stage capture in '{}'", dir.display()))?;
    Ok(staged.into_temp_path())
}

/// Renders every scene, compares it with its baseline and writes a comparison video for each
/// scene that differs.
///
/// Captures and diff videos live in one scratch directory under the project root, removed on
/// every exit path unless `cfg.retain_assets` is set.
#[tracing::instrument(skip_all)]
pub fn run_test(cfg: &VrtConfig) -> VrtResult<TestReport> {
    cfg.validate()?;
    let baselines = cfg
        .baselines
        .as_deref()
        .ok_or_else(|| VrtError::validation("a baseline glob is required to run tests"))?;

    let scenes = discover_scenes(&cfg.project_root, &cfg.scenes)?;
    match_baselines(&scenes, &cfg.project_root, baselines)?;

    let results_dir = absolute(&cfg.results_dir)?;
    let tool = cfg.video_tool();
    let scratch = ScratchDir::acquire(&cfg.project_root, ".vrt_", cfg.retain_assets)?;

    let mut report = TestReport::default();
    for scene in &scenes {
        let actual = scratch
            .path()
            .join(with_stem_suffix(&scene.relative, "_actual.avi"));
        let diff = scratch
            .path()
            .join(with_stem_suffix(&scene.relative, "_diff.avi"));
        let baseline = absolute(&scene.baseline_path())?;

        tracing::info!(scene = %scene.renderer_ref(), "testing scene");
        let rendered = render_scene(&cfg.renderer, &scene_job(cfg, scene, actual))?;
        let verdict = has_diff(&tool, &rendered.path, &baseline, &diff, cfg.frame_count)?;

        let (status, comparison) = if verdict.differs {
            let path = compose_comparison(
                &tool,
                &scene.relative,
                &rendered.path,
                &baseline,
                &results_dir,
            )?;
            tracing::warn!(
                scene = %scene.renderer_ref(),
                comparison = %path.display(),
                "scene differs from baseline"
            );
            (SceneStatus::Failed, Some(path))
        } else {
            tracing::info!(scene = %scene.renderer_ref(), "scene matches baseline");
            (SceneStatus::Passed, None)
        };

        report.scenes.push(SceneOutcome {
            scene: scene.relative.clone(),
            baseline,
            status,
            comparison,
            frames_requested: cfg.frame_count,
            frames_sampled: verdict.sampling.frames_scanned,
        });
    }

    scratch.release()?;

    if let Some(path) = &cfg.report {
        report.write_json(path)?;
        tracing::info!(path = %path.display(), "wrote report");
    }
    Ok(report)
}

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crate::foundation::{
    error::{VrtError, VrtResult},
    paths::{normalize, resolve_against, to_slash},
};

/// Container extension of baselines and captures.
pub const VIDEO_EXTENSION: &str = "avi";

/// A scene file discovered under the project root.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Scene {
    pub path: PathBuf,
    /// `path` relative to the project root.
    pub relative: PathBuf,
}

impl Scene {
    /// `scene.tscn` -> `scene.avi`, next to the scene source.
    pub fn baseline_path(&self) -> PathBuf {
        self.path.with_extension(VIDEO_EXTENSION)
    }

    /// The scene reference handed to the renderer.
    pub fn renderer_ref(&self) -> String {
        to_slash(&self.relative)
    }
}

/// Files matching `pattern`, resolved against `root`, in sorted order.
pub fn glob_files(root: &Path, pattern: &str) -> VrtResult<Vec<PathBuf>> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let root = root.to_str().ok_or_else(|| {
            VrtError::validation(format!(
                "project path '{}' is not valid UTF-8",
                root.display()
            ))
        })?;
        let escaped = glob::Pattern::escape(root);
        resolve_against(Path::new(&escaped), Path::new(pattern))
            .to_string_lossy()
            .into_owned()
    };

    let paths = glob::glob(&full)
        .map_err(|e| VrtError::validation(format!("invalid glob '{pattern}': {e}")))?;
    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| VrtError::Other(anyhow::Error::new(e)))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Scenes matching `pattern` under `root`, in discovery (sorted path) order.
///
/// An empty match is an error: a run over zero scenes is not a pass.
pub fn discover_scenes(root: &Path, pattern: &str) -> VrtResult<Vec<Scene>> {
    let norm_root = normalize(root);
    let mut scenes = Vec::new();
    for path in glob_files(root, pattern)? {
        let relative = normalize(&path)
            .strip_prefix(&norm_root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                VrtError::validation(format!(
                    "scene '{}' is outside the project root '{}'",
                    path.display(),
                    root.display()
                ))
            })?;
        scenes.push(Scene { path, relative });
    }
    if scenes.is_empty() {
        return Err(VrtError::NoScenes(pattern.to_string()));
    }
    tracing::debug!(count = scenes.len(), pattern, "discovered scenes");
    Ok(scenes)
}

/// Checks that every scene's baseline is among the files matching `pattern`.
///
/// All missing scenes are reported together.
pub fn match_baselines(scenes: &[Scene], root: &Path, pattern: &str) -> VrtResult<()> {
    let found: BTreeSet<PathBuf> = glob_files(root, pattern)?
        .into_iter()
        .map(|p| normalize(&p))
        .collect();
    let missing: Vec<PathBuf> = scenes
        .iter()
        .filter(|s| !found.contains(&normalize(&s.baseline_path())))
        .map(|s| s.path.clone())
        .collect();
    if !missing.is_empty() {
        return Err(VrtError::MissingBaselines(missing));
    }
    Ok(())
}

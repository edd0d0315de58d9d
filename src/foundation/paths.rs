use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::VrtResult;

pub fn ensure_parent_dir(path: &Path) -> VrtResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `path` when absolute, otherwise `path` joined onto `root`.
pub fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Absolute form of `path` without touching the filesystem.
pub fn absolute(path: &Path) -> VrtResult<PathBuf> {
    let abs = std::path::absolute(path)
        .with_context(|| format!("failed to resolve absolute path of '{}'", path.display()))?;
    Ok(abs)
}

/// Size of the file at `path`, or `None` when it does not exist or is not a regular file.
pub fn file_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

/// Forward-slash rendering of a relative path, the form the renderer expects for scene paths.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Drops `.` components so paths from different glob spellings compare equal.
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// `relative` with its extension removed and `suffix` appended to the file name.
pub fn with_stem_suffix(relative: &Path, suffix: &str) -> PathBuf {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}{suffix}");
    match relative.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

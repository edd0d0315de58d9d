use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::VrtResult;

/// Uniquely named working directory scoped to one pipeline run or one sampling call.
///
/// The directory tree is removed when the guard is released or dropped, on every exit path.
/// With `retain` set, release keeps the directory and reports its location instead.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<tempfile::TempDir>,
    path: PathBuf,
    retain: bool,
}

impl ScratchDir {
    pub fn acquire(base: &Path, prefix: &str, retain: bool) -> VrtResult<Self> {
        std::fs::create_dir_all(base)
            .with_context(|| format!("failed to create scratch base '{}'", base.display()))?;
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(base)
            .with_context(|| format!("failed to create scratch dir in '{}'", base.display()))?;
        let path = dir.path().to_path_buf();
        tracing::debug!(path = %path.display(), "acquired scratch dir");
        Ok(Self {
            dir: Some(dir),
            path,
            retain,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_retained(&self) -> bool {
        self.retain
    }

    /// Removes the directory tree (or keeps it when retained), surfacing removal errors.
    pub fn release(mut self) -> VrtResult<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        if self.retain {
            keep(dir);
            return Ok(());
        }
        dir.close()
            .with_context(|| format!("failed to remove scratch dir '{}'", self.path.display()))?;
        Ok(())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if self.retain {
            keep(dir);
        } else if let Err(e) = dir.close() {
            tracing::warn!(path = %self.path.display(), "failed to remove scratch dir: {e}");
        }
    }
}

fn keep(dir: tempfile::TempDir) {
    let path = dir.keep();
    tracing::warn!(path = %path.display(), "retaining scratch dir");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_removes_tree() {
        let base = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::acquire(base.path(), ".vrt_", false).unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::create_dir_all(path.join("nested")).unwrap();
        std::fs::write(path.join("nested/frame.png"), b"x").unwrap();

        scratch.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_tree_on_early_return() {
        let base = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchDir::acquire(base.path(), ".vrt_", false).unwrap();
            std::fs::write(scratch.path().join("a.avi"), b"x").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn retained_dir_survives_release_and_drop() {
        let base = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::acquire(base.path(), ".vrt_", true).unwrap();
        let path = scratch.path().to_path_buf();
        assert!(scratch.is_retained());
        scratch.release().unwrap();
        assert!(path.is_dir());

        let dropped = ScratchDir::acquire(base.path(), ".vrt_", true).unwrap();
        let dropped_path = dropped.path().to_path_buf();
        drop(dropped);
        assert!(dropped_path.is_dir());
    }

    #[test]
    fn names_are_unique_and_prefixed() {
        let base = tempfile::tempdir().unwrap();
        let a = ScratchDir::acquire(base.path(), ".frames_", false).unwrap();
        let b = ScratchDir::acquire(base.path(), ".frames_", false).unwrap();
        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".frames_"));
    }

    #[test]
    fn acquire_creates_missing_base() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("not/yet");
        let scratch = ScratchDir::acquire(&nested, ".vrt_", false).unwrap();
        assert!(scratch.path().starts_with(&nested));
    }
}

use std::path::PathBuf;

pub type VrtResult<T> = Result<T, VrtError>;

#[derive(thiserror::Error, Debug)]
pub enum VrtError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render failed: {0}")]
    RenderFailed(String),

    #[error("diff generation failed: {0}")]
    DiffGenerationFailed(String),

    #[error("comparison generation failed: {0}")]
    ComparisonGenerationFailed(String),

    #[error("frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("missing baselines for scenes: {}", display_paths(.0))]
    MissingBaselines(Vec<PathBuf>),

    #[error("no scenes matched '{0}'")]
    NoScenes(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VrtError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }

    pub fn diff_generation(msg: impl Into<String>) -> Self {
        Self::DiffGenerationFailed(msg.into())
    }

    pub fn comparison_generation(msg: impl Into<String>) -> Self {
        Self::ComparisonGenerationFailed(msg.into())
    }

    pub fn frame_extraction(msg: impl Into<String>) -> Self {
        Self::FrameExtraction(msg.into())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            VrtError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            VrtError::render_failed("x")
                .to_string()
                .contains("render failed:")
        );
        assert!(
            VrtError::diff_generation("x")
                .to_string()
                .contains("diff generation failed:")
        );
        assert!(
            VrtError::comparison_generation("x")
                .to_string()
                .contains("comparison generation failed:")
        );
        assert!(
            VrtError::frame_extraction("x")
                .to_string()
                .contains("frame extraction failed:")
        );
    }

    #[test]
    fn missing_baselines_lists_every_scene() {
        let err = VrtError::MissingBaselines(vec![
            PathBuf::from("scenes/a.tscn"),
            PathBuf::from("scenes/b.tscn"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("scenes/a.tscn"));
        assert!(msg.contains("scenes/b.tscn"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = VrtError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}

//! Movie capture of scenes through the external renderer.

pub mod scene;

pub use scene::{RenderedArtifact, SceneJob, render_scene};

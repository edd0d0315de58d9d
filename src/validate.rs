use std::{ffi::OsString, path::Path};

use crate::{
    config::VrtConfig,
    foundation::error::{VrtError, VrtResult},
    process::run_command,
    video::ffmpeg::VideoTool,
};

/// Renderer releases whose movie capture output is known to be stable.
pub const SUPPORTED_RENDERER_VERSIONS: &[&str] = &["4.4.1", "4.4", "4.3", "4.2.2", "4.1.4"];

/// File that marks a directory as a project root.
pub const PROJECT_MARKER: &str = "project.godot";

/// `true` for stable builds of a supported release, e.g. `4.4.1.stable.official.49a5bc7b6`.
pub fn is_supported_version(version: &str) -> bool {
    let version = version.trim();
    version.contains("stable")
        && SUPPORTED_RENDERER_VERSIONS.iter().any(|v| {
            version
                .strip_prefix(v)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
}

/// Asks the renderer for its version and checks it against the allow-list.
pub fn verify_renderer(renderer: &Path) -> VrtResult<String> {
    let args: Vec<OsString> = vec!["--version".into(), "--headless".into()];
    let out = run_command(renderer, &args, None).map_err(|e| {
        VrtError::validation(format!(
            "cannot run renderer at '{}': {e}",
            renderer.display()
        ))
    })?;
    if !out.success() {
        return Err(VrtError::validation(format!(
            "renderer at '{}' {}",
            renderer.display(),
            out.failure_summary()
        )));
    }

    let version = out.stdout.trim().to_string();
    if !is_supported_version(&version) {
        return Err(VrtError::validation(format!(
            "renderer version '{version}' is not supported; install one of the stable versions {}",
            SUPPORTED_RENDERER_VERSIONS.join(", ")
        )));
    }
    Ok(version)
}

pub fn verify_video_tool(tool: &VideoTool) -> VrtResult<()> {
    if !tool.is_available() {
        return Err(VrtError::validation(format!(
            "cannot run video tool '{}' (is it installed and on PATH?)",
            tool.program().display()
        )));
    }
    Ok(())
}

pub fn verify_project(project_root: &Path) -> VrtResult<()> {
    let marker = project_root.join(PROJECT_MARKER);
    if !marker.is_file() {
        return Err(VrtError::validation(format!(
            "'{}' does not exist; is '{}' a project root?",
            marker.display(),
            project_root.display()
        )));
    }
    Ok(())
}

/// Checks everything a run needs before any scene is rendered. Returns the renderer version.
#[tracing::instrument(skip_all)]
pub fn validate_environment(cfg: &VrtConfig) -> VrtResult<String> {
    cfg.validate()?;
    let version = verify_renderer(&cfg.renderer)?;
    tracing::info!(%version, "renderer version");
    verify_video_tool(&cfg.video_tool())?;
    verify_project(&cfg.project_root)?;
    Ok(version)
}

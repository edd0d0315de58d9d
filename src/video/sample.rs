use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::DynamicImage;

use crate::{
    foundation::error::{VrtError, VrtResult},
    scratch::ScratchDir,
    video::ffmpeg::VideoTool,
};

/// RGBA channels of one pixel, widened to 16 bits so 8- and 16-bit frames compare exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelSample(pub [u16; 4]);

/// Row-major uniformity scan across any number of frames.
///
/// The first pixel fed in becomes the reference; it is derived per run because the
/// "no difference" colour of a blended video depends on codec and colour handling.
#[derive(Clone, Debug, Default)]
pub struct UniformityScan {
    reference: Option<PixelSample>,
    frames: usize,
}

impl UniformityScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans every pixel of `frame`. Returns `false` at the first pixel that differs from the
    /// reference; the scan should not be fed further frames after that.
    pub fn feed(&mut self, frame: &DynamicImage) -> bool {
        self.frames += 1;
        let rgba = frame.to_rgba16();
        for px in rgba.pixels() {
            let sample = PixelSample(px.0);
            match self.reference {
                None => self.reference = Some(sample),
                Some(reference) if reference != sample => return false,
                Some(_) => {}
            }
        }
        true
    }

    pub fn reference(&self) -> Option<PixelSample> {
        self.reference
    }

    pub fn frames_scanned(&self) -> usize {
        self.frames
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformityReport {
    /// Every scanned pixel matched the reference. Vacuously true when nothing was extracted.
    pub uniform: bool,
    pub frames_requested: u32,
    pub frames_extracted: usize,
    pub frames_scanned: usize,
    pub reference: Option<PixelSample>,
}

impl UniformityReport {
    pub fn is_short(&self) -> bool {
        self.frames_extracted < self.frames_requested as usize
    }
}

/// Extracts the first `frame_count` frames of `video` and checks whether every pixel of every
/// extracted frame has the same RGBA value.
///
/// Frames are extracted into a scratch directory next to `video`, removed before returning.
/// Extracting fewer frames than requested is logged and the available frames are scanned.
#[tracing::instrument(skip(tool, video), fields(video = %video.display()))]
pub fn has_uniform_pixel_value(
    tool: &VideoTool,
    video: &Path,
    frame_count: u32,
) -> VrtResult<UniformityReport> {
    if frame_count == 0 {
        return Err(VrtError::validation("frame count must be at least 1"));
    }

    let base = video
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let scratch = ScratchDir::acquire(base, &format!(".frames_{stem}_"), false)?;

    let args = tool.extract_frames_args(video, frame_count, scratch.path());
    let out = tool.run(&args).map_err(|e| {
        VrtError::frame_extraction(format!(
            "failed to run '{}': {e}",
            tool.program().display()
        ))
    })?;
    if !out.success() {
        return Err(VrtError::frame_extraction(format!(
            "'{}' {}",
            video.display(),
            out.failure_summary()
        )));
    }

    let frames = list_frames(scratch.path())?;
    if frames.is_empty() {
        tracing::warn!(
            requested = frame_count,
            "no frames extracted; treating video as uniform"
        );
    } else if frames.len() < frame_count as usize {
        tracing::warn!(
            requested = frame_count,
            extracted = frames.len(),
            "fewer frames extracted than requested; scanning the available frames"
        );
    }

    let mut scan = UniformityScan::new();
    let mut uniform = true;
    for path in &frames {
        let frame = image::open(path).map_err(|e| {
            VrtError::frame_extraction(format!("failed to decode frame '{}': {e}", path.display()))
        })?;
        if !scan.feed(&frame) {
            uniform = false;
            break;
        }
    }

    let report = UniformityReport {
        uniform,
        frames_requested: frame_count,
        frames_extracted: frames.len(),
        frames_scanned: scan.frames_scanned(),
        reference: scan.reference(),
    };
    scratch.release()?;
    Ok(report)
}

/// Extracted frame images in `dir`, sorted by name.
pub fn list_frames(dir: &Path) -> VrtResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list frames in '{}'", dir.display()))?;
    let mut frames = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list frames in '{}'", dir.display()))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("frame_") && name.ends_with(".png") {
            frames.push(entry.path());
        }
    }
    frames.sort();
    Ok(frames)
}

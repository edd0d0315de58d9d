//! Video-tool operations: difference blending, frame sampling and comparison composition.

pub mod compare;
pub mod diff;
pub mod ffmpeg;
pub mod sample;

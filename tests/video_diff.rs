use std::{
    path::Path,
    process::{Command, Stdio},
};

use godot_vrt::{VideoTool, compose_comparison, has_diff, has_uniform_pixel_value};

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Lossless capture of a lavfi test source.
fn synth(path: &Path, source: &str, frames: u32) -> anyhow::Result<()> {
    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-f", "lavfi", "-i", source])
        .args(["-frames:v", &frames.to_string(), "-pix_fmt", "yuv420p"])
        .args(["-c:v", "ffv1"])
        .arg(path)
        .stdin(Stdio::null())
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating {}", path.display());
    Ok(())
}

#[test]
fn identical_videos_have_no_diff() {
    if !ffmpeg_available() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let baseline = tmp.path().join("baseline.avi");
    let rendered = tmp.path().join("rendered.avi");
    synth(&baseline, "testsrc=size=64x64:rate=30", 10).unwrap();
    std::fs::copy(&baseline, &rendered).unwrap();

    let tool = VideoTool::ffmpeg(false);
    let verdict = has_diff(
        &tool,
        &rendered,
        &baseline,
        &tmp.path().join("out/diff.avi"),
        10,
    )
    .unwrap();
    assert!(!verdict.differs);
    assert!(verdict.sampling.frames_scanned > 0);
    assert!(verdict.diff_video.unwrap().is_file());
}

#[test]
fn different_videos_have_a_diff() {
    if !ffmpeg_available() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let baseline = tmp.path().join("baseline.avi");
    let rendered = tmp.path().join("rendered.avi");
    synth(&baseline, "testsrc=size=64x64:rate=30", 10).unwrap();
    synth(&rendered, "testsrc2=size=64x64:rate=30", 10).unwrap();

    let tool = VideoTool::ffmpeg(false);
    let verdict = has_diff(&tool, &rendered, &baseline, &tmp.path().join("diff.avi"), 10).unwrap();
    assert!(verdict.differs);
}

#[test]
fn faint_two_pixel_change_is_a_diff() {
    if !ffmpeg_available() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let baseline = tmp.path().join("baseline.avi");
    let rendered = tmp.path().join("rendered.avi");
    let grey = "color=c=0x808080:size=64x64:rate=30";
    synth(&baseline, grey, 10).unwrap();
    synth(
        &rendered,
        &format!("{grey},drawbox=x=10:y=10:w=2:h=2:color=0x888888:t=fill"),
        10,
    )
    .unwrap();

    let tool = VideoTool::ffmpeg(false);
    let verdict = has_diff(&tool, &rendered, &baseline, &tmp.path().join("diff.avi"), 10).unwrap();
    assert!(verdict.differs);
}

#[test]
fn solid_colour_video_is_uniform() {
    if !ffmpeg_available() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let video = tmp.path().join("solid.avi");
    synth(&video, "color=c=black:size=32x32:rate=30", 5).unwrap();

    let report = has_uniform_pixel_value(&VideoTool::ffmpeg(false), &video, 5).unwrap();
    assert!(report.uniform);
    assert_eq!(report.frames_extracted, 5);
    assert!(report.reference.is_some());
}

#[test]
fn short_video_scans_what_was_extracted() {
    if !ffmpeg_available() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let video = tmp.path().join("short.avi");
    synth(&video, "color=c=black:size=32x32:rate=30", 4).unwrap();

    let report = has_uniform_pixel_value(&VideoTool::ffmpeg(false), &video, 12).unwrap();
    assert!(report.uniform);
    assert_eq!(report.frames_extracted, 4);
    assert!(report.is_short());
}

#[test]
fn comparison_stacks_three_equal_panes() {
    if !ffmpeg_available() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let baseline = tmp.path().join("baseline.avi");
    let rendered = tmp.path().join("rendered.avi");
    synth(&baseline, "testsrc=size=64x48:rate=30", 5).unwrap();
    synth(&rendered, "testsrc2=size=64x48:rate=30", 5).unwrap();

    let results = tmp.path().join("results");
    let out = compose_comparison(
        &VideoTool::ffmpeg(false),
        Path::new("scenes/menu.tscn"),
        &rendered,
        &baseline,
        &results,
    )
    .unwrap();
    assert_eq!(out, results.join("scenes/menu.avi"));

    let still = tmp.path().join("still.png");
    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-y", "-i"])
        .arg(&out)
        .args(["-frames:v", "1"])
        .arg(&still)
        .stdin(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(image::image_dimensions(&still).unwrap(), (64 * 3, 48));

    // A second run for the same scene overwrites in place.
    let again = compose_comparison(
        &VideoTool::ffmpeg(false),
        Path::new("scenes/menu.tscn"),
        &rendered,
        &baseline,
        &results,
    )
    .unwrap();
    assert_eq!(again, out);
    assert_eq!(std::fs::read_dir(results.join("scenes")).unwrap().count(), 1);
}

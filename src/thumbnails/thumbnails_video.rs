use super::command::run_tool;
use super::strategy::{Attempt, ThumbnailStrategy};
use crate::binary_resolver::resolve_binary;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Seek offset of the extracted frame; skips the black first frame most clips open with.
const FRAME_OFFSET_SECS: &str = "0.5";

/// Grabs a single frame with `ffmpeg` and writes it as JPEG.
/// There is no in-process fallback for video.
pub struct FfmpegFrame {
    pub timeout: Option<Duration>,
}

impl ThumbnailStrategy for FfmpegFrame {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn attempt(&self, src: &Path, dst: &Path) -> Attempt {
        let Some(ffmpeg) = resolve_binary("ffmpeg", Some("LK_FFMPEG")) else {
            return Attempt::Unavailable("ffmpeg not found".into());
        };
        match run_tool(frame_command(&ffmpeg, src, dst), self.timeout) {
            Ok(()) => Attempt::Generated,
            Err(err) => Attempt::Failed(err),
        }
    }
}

fn frame_command(ffmpeg: &Path, src: &Path, dst: &Path) -> Command {
    let mut cmd = Command::new(ffmpeg);
    // The cache path keeps the source's `.mp4` name, so the muxer and codec are forced.
    cmd.arg("-y")
        .arg("-v")
        .arg("error")
        .arg("-ss")
        .arg(FRAME_OFFSET_SECS)
        .arg("-i")
        .arg(src)
        .arg("-vframes")
        .arg("1")
        .arg("-f")
        .arg("image2")
        .arg("-c:v")
        .arg("mjpeg")
        .arg(dst);
    cmd
}

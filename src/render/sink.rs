//! Frame consumers: ffmpeg video encoding, PNG sequences, in-memory capture.
//!
//! Sinks receive frames strictly in increasing index order.

use super::sequence::Frame;
use crate::error::{GeoidError, Result};
use image::RgbImage;
use std::borrow::Cow;
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use tracing::{debug, info};

pub trait FrameSink {
    fn push(&mut self, index: usize, frame: &Frame) -> Result<()>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects frames in memory; refuses out-of-order pushes.
impl FrameSink for Vec<Frame> {
    fn push(&mut self, index: usize, frame: &Frame) -> Result<()> {
        if index != self.len() {
            return Err(GeoidError::Encoder(format!(
                "frame {} arrived while expecting frame {}",
                index,
                self.len()
            )));
        }
        Vec::push(self, frame.clone());
        Ok(())
    }
}

fn frame_bytes(frame: &Frame) -> Cow<'_, [u8]> {
    match frame.as_slice() {
        Some(bytes) => Cow::Borrowed(bytes),
        None => Cow::Owned(frame.iter().copied().collect()),
    }
}

fn check_square(frame: &Frame, size: usize) -> Result<()> {
    if frame.dim() != (size, size, 3) {
        return Err(GeoidError::Encoder(format!(
            "frame shape {:?} does not match {}x{}x3",
            frame.dim(),
            size,
            size
        )));
    }
    Ok(())
}

/// Ffmpeg 인코더 설정
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// ffmpeg 실행 파일 경로
    pub program: OsString,
    pub codec: String,
    pub crf: u32,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            program: OsString::from("ffmpeg"),
            codec: "libx264".to_string(),
            crf: 20,
        }
    }
}

/// Streams raw rgb24 frames into an `ffmpeg` child process.
pub struct FfmpegSink {
    child: Child,
    stdin: Option<ChildStdin>,
    size: usize,
    path: PathBuf,
    frames: usize,
}

impl FfmpegSink {
    pub fn new(path: impl AsRef<Path>, size: usize, fps: u32) -> Result<Self> {
        Self::with_config(path, size, fps, &FfmpegConfig::default())
    }

    pub fn with_config(path: impl AsRef<Path>, size: usize, fps: u32, config: &FfmpegConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let size_arg = format!("{}x{}", size, size);
        let fps_arg = fps.to_string();
        let crf_arg = config.crf.to_string();

        let mut cmd = Command::new(&config.program);
        cmd.args([
            "-y",
            "-hide_banner",
            "-loglevel", "error",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-s", &size_arg,
            "-r", &fps_arg,
            "-i", "pipe:0",
            "-an",
            "-c:v", &config.codec,
            "-crf", &crf_arg,
            // yuv420p 는 짝수 크기만 허용
            "-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-pix_fmt", "yuv420p",
        ])
        .arg(&path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|e| {
            GeoidError::Encoder(format!(
                "failed to start {}: {}",
                config.program.to_string_lossy(),
                e
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GeoidError::Encoder("ffmpeg stdin unavailable".to_string()))?;

        info!(path = %path.display(), size, fps, codec = %config.codec, "ffmpeg encoder started");
        Ok(Self {
            child,
            stdin: Some(stdin),
            size,
            path,
            frames: 0,
        })
    }
}

impl FrameSink for FfmpegSink {
    fn push(&mut self, index: usize, frame: &Frame) -> Result<()> {
        check_square(frame, self.size)?;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| GeoidError::Encoder("encoder already finished".to_string()))?;
        stdin.write_all(&frame_bytes(frame)).map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe => GeoidError::Encoder(format!(
                "ffmpeg closed its input at frame {}",
                index
            )),
            _ => GeoidError::Io(e),
        })?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        // stdin 을 닫아야 ffmpeg 가 컨테이너를 마무리한다
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            return Err(GeoidError::Encoder(format!("ffmpeg exited with {}", status)));
        }
        info!(path = %self.path.display(), frames = self.frames, "video written");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            // finish() 없이 버려진 경우
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    frames: usize,
}

impl PngSequenceSink {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, frames: 0 })
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", index))
    }
}

pub(crate) fn to_rgb_image(frame: &Frame) -> Result<RgbImage> {
    let (h, w, _) = frame.dim();
    RgbImage::from_raw(w as u32, h as u32, frame_bytes(frame).into_owned())
        .ok_or_else(|| GeoidError::Encoder(format!("frame shape {:?} is not RGB", frame.dim())))
}

impl FrameSink for PngSequenceSink {
    fn push(&mut self, index: usize, frame: &Frame) -> Result<()> {
        let path = self.frame_path(index);
        to_rgb_image(frame)?.save(&path)?;
        debug!(path = %path.display(), "frame written");
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        info!(dir = %self.dir.display(), frames = self.frames, "png sequence written");
        Ok(())
    }
}

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::carousel::{VideoError, VideoHandle};

/// Parse ffprobe's `WIDTHxHEIGHT` output.
pub fn parse_probe_size(output: &str) -> Result<(u32, u32), VideoError> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let (w, h) = line
        .split_once('x')
        .ok_or_else(|| VideoError::Probe(format!("unexpected ffprobe output '{line}'")))?;
    let parse = |v: &str| v.trim().parse::<u32>().ok().filter(|n| *n > 0);
    match (parse(w), parse(h)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(VideoError::Probe(format!("invalid frame size '{line}'"))),
    }
}

/// Frame size of the first video stream of `path`.
pub fn probe_size(path: &Path) -> Result<(u32, u32), VideoError> {
    let output = Command::new("ffprobe")
        .args(["-v", "error"])
        .args(["-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height"])
        .args(["-of", "csv=s=x:p=0"])
        .arg(path)
        .output()
        .map_err(|source| VideoError::Spawn { path: path.display().to_string(), source })?;
    if !output.status.success() {
        return Err(VideoError::Probe(format!(
            "{}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    parse_probe_size(&String::from_utf8_lossy(&output.stdout))
}

/// A running `ffmpeg` process streaming raw RGBA frames on stdout.
struct Decoder {
    process: Child,
    frames: Option<Receiver<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

impl Decoder {
    fn spawn(program: &Path, path: &Path, width: u32, height: u32) -> std::io::Result<Decoder> {
        let mut process = Command::new(program)
            .args(["-loglevel", "error"])
            .arg("-re")
            .args(["-stream_loop", "-1"])
            .arg("-i")
            .arg(path)
            .arg("-an")
            .args(["-f", "rawvideo"])
            .args(["-pix_fmt", "rgba"])
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stdout was not captured"))?;

        let frame_len = width as usize * height as usize * 4;
        // One frame in flight: a paused consumer stalls the decoder
        let (tx, rx) = mpsc::sync_channel(1);
        let reader = thread::spawn(move || {
            let mut stdout = BufReader::new(stdout);
            loop {
                let mut frame = vec![0u8; frame_len];
                if stdout.read_exact(&mut frame).is_err() || tx.send(frame).is_err() {
                    break;
                }
            }
        });

        Ok(Decoder { process, frames: Some(rx), reader: Some(reader) })
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
        // Dropping the receiver unblocks a reader waiting on send
        self.frames = None;
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

/// Video element backed by an ffmpeg decoder process.
///
/// Pausing keeps the process but stops pulling frames. Rewinding kills it;
/// the next `play` starts again from the first frame.
pub struct FfmpegVideo {
    path: PathBuf,
    program: PathBuf,
    size: (u32, u32),
    decoder: Option<Decoder>,
    frame: Option<Vec<u8>>,
    playing: bool,
    muted: bool,
}

impl FfmpegVideo {
    pub fn new(path: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            path: path.into(),
            program: PathBuf::from("ffmpeg"),
            size,
            decoder: None,
            frame: None,
            playing: false,
            muted: true,
        }
    }

    /// Probe the size with ffprobe, then wrap the file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, VideoError> {
        let path = path.into();
        let size = probe_size(&path)?;
        debug!(path = %path.display(), width = size.0, height = size.1, "Opened video");
        Ok(Self::new(path, size))
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Pull the newest decoded frame while playing. Returns true when the
    /// frame changed.
    pub fn poll(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let Some(frames) = self.decoder.as_ref().and_then(|d| d.frames.as_ref()) else {
            return false;
        };
        let mut updated = false;
        loop {
            match frames.try_recv() {
                Ok(frame) => {
                    self.frame = Some(frame);
                    updated = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!(path = %self.path.display(), "Decoder stopped");
                    self.decoder = None;
                    self.playing = false;
                    break;
                }
            }
        }
        updated
    }

    /// Last decoded RGBA frame, `width * height * 4` bytes.
    pub fn frame(&self) -> Option<&[u8]> {
        self.frame.as_deref()
    }
}

impl VideoHandle for FfmpegVideo {
    // Decoding runs with -an, there is never sound to unmute
    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn play(&mut self) -> Result<(), VideoError> {
        if self.decoder.is_none() {
            let decoder = Decoder::spawn(&self.program, &self.path, self.size.0, self.size.1)
                .map_err(|source| VideoError::Spawn { path: self.path.display().to_string(), source })?;
            self.decoder = Some(decoder);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {
        self.decoder = None;
        self.frame = None;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_output_parses() {
        assert_eq!(parse_probe_size("1920x1080\n").unwrap(), (1920, 1080));
        assert_eq!(parse_probe_size("\n 640x360 \n").unwrap(), (640, 360));
    }

    #[test]
    fn bad_probe_output_is_an_error() {
        for output in ["", "1920", "0x1080", "axb", "1920x"] {
            assert!(matches!(parse_probe_size(output), Err(VideoError::Probe(_))), "{output:?}");
        }
    }

    #[test]
    fn missing_decoder_refuses_to_play() {
        let mut video = FfmpegVideo::new("/tmp/clip.mp4", (16, 9)).with_program("/nonexistent/ffmpeg-binary");
        assert!(matches!(video.play(), Err(VideoError::Spawn { .. })));
        assert!(!video.is_playing());
        assert!(!video.poll());
        assert!(video.frame().is_none());
    }

    #[test]
    fn controls_without_a_decoder() {
        let mut video = FfmpegVideo::new("/tmp/clip.mp4", (16, 9));
        assert!(video.is_muted());
        video.set_muted(false);
        assert!(!video.is_muted());
        video.pause();
        video.rewind();
        assert!(!video.is_playing());
        assert_eq!(video.size(), (16, 9));
    }
}

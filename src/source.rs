//! Readable media source abstraction over still images, animated GIFs and
//! ffmpeg-decoded video files.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command as ProcCommand;
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, RgbImage};
use walkdir::WalkDir;

use crate::error::SourceError;
use crate::playback::LoopMode;

/// Coarse classification of a media path, decided before any decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Single raster image; converted synchronously-in-spirit, never played.
    Still,
    /// Animated image; loops by convention.
    Animated,
    /// Single-pass video; plays once by convention.
    Video,
}

impl MediaKind {
    pub fn of_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png" | "jpg" | "jpeg" | "bmp") => Self::Still,
            Some("gif") => Self::Animated,
            // Anything else goes through the external decoder.
            _ => Self::Video,
        }
    }

    pub fn is_still(self) -> bool {
        matches!(self, Self::Still)
    }

    pub fn default_loop_mode(self) -> LoopMode {
        match self {
            Self::Animated => LoopMode::Loop,
            Self::Still | Self::Video => LoopMode::Once,
        }
    }
}

/// Sequential frame reader over one opened media source.
///
/// Implementations yield frames in strict source order. A frame that cannot
/// be decoded ends the stream; it is not an error once the source has
/// opened.
pub trait MediaSource {
    /// Reported frames per second; `<= 0.0` when the source does not know.
    fn frame_rate(&self) -> f64;

    /// Total frame count when known ahead of decode; `0` when unknown.
    fn total_frames(&self) -> usize;

    /// Next frame, or `None` once exhausted or unreadable.
    fn next_frame(&mut self) -> Option<RgbImage>;
}

/// Opens `path` with the decoder appropriate for its [`MediaKind`].
///
/// `extract_width` bounds the pixel width of frames pulled through the
/// external video decoder; the frame renderer still resamples to the exact
/// target grid.
pub fn open_media(path: &Path, extract_width: u32) -> Result<Box<dyn MediaSource + Send>, SourceError> {
    match MediaKind::of_path(path) {
        MediaKind::Still => Ok(Box::new(StillSource::open(path)?)),
        MediaKind::Animated => Ok(Box::new(GifSource::open(path)?)),
        MediaKind::Video => Ok(Box::new(VideoSource::open(path, extract_width)?)),
    }
}

/// One-frame source for a raster image.
#[derive(Debug)]
struct StillSource {
    frame: Option<RgbImage>,
}

impl StillSource {
    fn open(path: &Path) -> Result<Self, SourceError> {
        let frame = image::open(path)
            .map_err(|err| SourceError::open(path, err))?
            .to_rgb8();
        Ok(Self { frame: Some(frame) })
    }
}

impl MediaSource for StillSource {
    fn frame_rate(&self) -> f64 {
        0.0
    }

    fn total_frames(&self) -> usize {
        1
    }

    fn next_frame(&mut self) -> Option<RgbImage> {
        self.frame.take()
    }
}

/// Animated GIF source.
///
/// Frames are decoded up front when the source opens (which happens on the
/// worker thread), so the exact total is known and cancellation stays
/// frame-granular over the buffered frames.
struct GifSource {
    frames: std::vec::IntoIter<RgbImage>,
    frame_rate: f64,
    total: usize,
}

impl GifSource {
    fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|err| SourceError::open(path, err))?;
        let decoder =
            GifDecoder::new(BufReader::new(file)).map_err(|err| SourceError::open(path, err))?;

        let mut frames = Vec::new();
        let mut frame_rate = 0.0;
        for decoded in decoder.into_frames() {
            let frame = match decoded {
                Ok(frame) => frame,
                Err(err) => {
                    // One bad frame ends the stream; keep what decoded so far.
                    log::warn!("gif frame decode failed in {}: {err}", path.display());
                    break;
                }
            };
            if frames.is_empty() {
                let (numer, denom) = frame.delay().numer_denom_ms();
                if numer > 0 && denom > 0 {
                    frame_rate = 1000.0 * f64::from(denom) / f64::from(numer);
                }
            }
            frames.push(DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8());
        }

        let total = frames.len();
        Ok(Self {
            frames: frames.into_iter(),
            frame_rate,
            total,
        })
    }
}

impl MediaSource for GifSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn total_frames(&self) -> usize {
        self.total
    }

    fn next_frame(&mut self) -> Option<RgbImage> {
        self.frames.next()
    }
}

/// Video source backed by an external `ffmpeg` process.
///
/// Opening extracts every frame as a PNG into a temp directory (scaled to
/// `extract_width` columns, height preserved), probes the frame rate with
/// `ffprobe`, then streams the extracted frames back in order.
struct VideoSource {
    paths: std::vec::IntoIter<PathBuf>,
    frame_rate: f64,
    total: usize,
    _frames_dir: TempDirGuard,
}

impl VideoSource {
    fn open(path: &Path, extract_width: u32) -> Result<Self, SourceError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("glyphcast_{}_{}", std::process::id(), stamp));
        fs::create_dir_all(&dir).map_err(|err| SourceError::open(path, err))?;
        let frames_dir = TempDirGuard { path: dir };

        let scale = format!("scale={}:-2", extract_width.max(2));
        let status = ProcCommand::new("ffmpeg")
            .args(["-loglevel", "error", "-y", "-i"])
            .arg(path)
            .arg("-vf")
            .arg(&scale)
            .arg(frames_dir.path.join("frame_%05d.png"))
            .status()
            .map_err(|err| SourceError::decoder(path, format!("running ffmpeg: {err}")))?;
        if !status.success() {
            return Err(SourceError::decoder(path, "ffmpeg exited with failure"));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&frames_dir.path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        paths.sort();

        let frame_rate = probe_frame_rate(path);
        let total = paths.len();
        log::debug!(
            "extracted {total} frames from {} at reported {frame_rate} fps",
            path.display()
        );

        Ok(Self {
            paths: paths.into_iter(),
            frame_rate,
            total,
            _frames_dir: frames_dir,
        })
    }
}

impl MediaSource for VideoSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn total_frames(&self) -> usize {
        self.total
    }

    fn next_frame(&mut self) -> Option<RgbImage> {
        let path = self.paths.next()?;
        match image::open(&path) {
            Ok(frame) => Some(frame.to_rgb8()),
            Err(err) => {
                // Treat a corrupt extracted frame as end-of-source so the
                // frames decoded so far stay usable.
                log::warn!("unreadable extracted frame {}: {err}", path.display());
                None
            }
        }
    }
}

/// Reported stream frame rate via `ffprobe`; `0.0` (unknown) on any failure.
fn probe_frame_rate(path: &Path) -> f64 {
    let output = ProcCommand::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=r_frame_rate",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output();
    let output = match output {
        Ok(output) if output.status.success() => output,
        _ => return 0.0,
    };
    let text = String::from_utf8_lossy(&output.stdout);
    parse_rational_rate(text.trim())
}

/// Parses ffprobe's `r_frame_rate` rational (`"30000/1001"` or `"25"`).
fn parse_rational_rate(text: &str) -> f64 {
    let mut parts = text.splitn(2, '/');
    let numer: f64 = parts.next().and_then(|n| n.trim().parse().ok()).unwrap_or(0.0);
    let denom: f64 = parts.next().map_or(1.0, |d| d.trim().parse().unwrap_or(0.0));
    if numer > 0.0 && denom > 0.0 {
        numer / denom
    } else {
        0.0
    }
}

/// Removes the extracted-frames directory when the source is dropped.
struct TempDirGuard {
    path: PathBuf,
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

//! Full-rate export of rendered output to files.
//!
//! Export iterates the complete [`FrameSequence`] independently of the
//! display scheduler, so every frame lands on disk even when playback
//! would have skipped it.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

use crate::output;
use crate::render::{FrameSequence, RenderedFrame};

/// On-disk realization of exported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain glyph text, colors dropped.
    Text,
    /// 24-bit ANSI escapes, ready for `cat` in a truecolor terminal.
    Ansi,
    /// Standalone HTML document per frame.
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text | Self::Ansi => "txt",
            Self::Html => "html",
        }
    }

    fn realize(self, frame: &RenderedFrame) -> String {
        match self {
            Self::Text => output::plain_text(frame),
            Self::Ansi => output::ansi(frame),
            Self::Html => output::html_document(frame),
        }
    }
}

/// Writes every frame of `sequence` to `dir` as
/// `frame_0001.<ext>`, `frame_0002.<ext>`, … and returns the frame count.
pub fn write_sequence(sequence: &FrameSequence, dir: &Path, format: ExportFormat) -> Result<usize> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    sequence
        .frames()
        .par_iter()
        .enumerate()
        .try_for_each(|(index, frame)| -> Result<()> {
            let path = dir.join(format!("frame_{:04}.{}", index + 1, format.extension()));
            fs::write(&path, format.realize(frame))
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(())
        })?;

    Ok(sequence.len())
}

/// Writes one rendered frame to `path` in the given format.
pub fn write_frame(frame: &RenderedFrame, path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    fs::write(path, format.realize(frame)).with_context(|| format!("writing {}", path.display()))
}

//! # glyphcast - media to glyph-art transcoder and player
//!
//! `glyphcast` converts raster images, animated GIFs and videos into
//! colored or monochrome glyph text, and plays motion sources back at
//! their native frame rate while the conversion runs in the background.
//!
//! ## Pipeline
//!
//! A media source is read frame by frame on a background worker thread;
//! each frame is resized to an aspect-corrected character grid and mapped
//! through a luminance-indexed glyph palette. The completed, ordered
//! [`FrameSequence`] is then handed to a wall-clock [`PlaybackSession`]
//! that decides, per timer tick, which frame to display. Still images take
//! the same pipeline with sequence length 1 and no scheduler.
//!
//! ## Example
//!
//! ```no_run
//! use glyphcast::{ColorMode, ConversionRequest, GlyphPalette, Session, SessionOutcome, Tick};
//! use std::path::PathBuf;
//! use std::time::{Duration, Instant};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::new();
//!     session.start(ConversionRequest {
//!         path: PathBuf::from("clip.mp4"),
//!         width: 78,
//!         palette: GlyphPalette::new("@%#*+=-:. ")?,
//!         mode: ColorMode::Color,
//!         loop_override: None,
//!     })?;
//!
//!     match session.run_to_completion(|p| eprintln!("{}/{}", p.processed, p.total))? {
//!         SessionOutcome::Still(frame) => print!("{}", glyphcast::output::ansi(&frame)),
//!         SessionOutcome::Motion(mut playback) => loop {
//!             match playback.tick(Instant::now()) {
//!                 Tick::Show(index) => {
//!                     let frame = playback.sequence().get(index).unwrap();
//!                     print!("\x1b[2J\x1b[H{}", glyphcast::output::ansi(frame));
//!                 }
//!                 Tick::Hold => {}
//!                 Tick::Ended => break,
//!             }
//!             std::thread::sleep(Duration::from_millis(10));
//!         },
//!         SessionOutcome::Cancelled => eprintln!("stopped"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod palette;
pub mod playback;
pub mod render;
pub mod session;
pub mod source;
pub mod worker;

pub use config::{load_config, AppConfig, DEFAULT_MOTION_WIDTH, DEFAULT_STILL_WIDTH};
pub use error::{SessionError, SourceError, ValidationError};
pub use export::{write_frame, write_sequence, ExportFormat};
pub use palette::{Cell, ColorMode, GlyphPalette, BLOCK_RAMP, CLASSIC_RAMP, DENSE_RAMP};
pub use playback::{LoopMode, PlaybackSession, Tick};
pub use render::{render_frame, FrameSequence, RenderedFrame, CELL_ASPECT};
pub use session::{ConversionRequest, Session, SessionOutcome};
pub use source::{open_media, MediaKind, MediaSource};
pub use worker::{ProgressEvent, WorkerEvent, WorkerHandle, WorkerOutcome, DEFAULT_FRAME_RATE};

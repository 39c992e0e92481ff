//! Session lifecycle controller.
//!
//! One [`Session`] owns one active conversion/playback request: it
//! validates parameters, guarantees at most one in-flight worker by
//! cancelling-and-awaiting any prior one before starting the next, and
//! resolves the worker's terminal state into a single discriminated
//! outcome. Nothing escapes the background/foreground boundary as an
//! uncaught fault.

use std::path::PathBuf;

use crate::error::{SessionError, SourceError, ValidationError};
use crate::palette::{ColorMode, GlyphPalette};
use crate::playback::{LoopMode, PlaybackSession};
use crate::render::RenderedFrame;
use crate::source::{open_media, MediaKind, MediaSource};
use crate::worker::{self, ProgressEvent, WorkerEvent, WorkerHandle, WorkerOutcome, WorkerSettings};

/// Parameters of one conversion request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub path: PathBuf,
    /// Output character width; must be positive.
    pub width: u32,
    pub palette: GlyphPalette,
    pub mode: ColorMode,
    /// Overrides the loop convention derived from the source kind
    /// (animated sources loop, single-pass video does not).
    pub loop_override: Option<LoopMode>,
}

/// How one completed conversion is consumed.
#[derive(Debug)]
pub enum SessionOutcome {
    /// A still image: the single rendered frame, no scheduler involved.
    Still(RenderedFrame),
    /// A motion source: playback has started and is ready to be ticked.
    Motion(PlaybackSession),
    /// The worker observed a cooperative stop; nothing to play.
    Cancelled,
}

/// Owner of the worker and playback state for one active request.
#[derive(Default)]
pub struct Session {
    worker: Option<WorkerHandle>,
    pending: Option<PendingRun>,
}

struct PendingRun {
    kind: MediaKind,
    loop_mode: LoopMode,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts converting the media at `request.path`.
    ///
    /// Validates before any work begins, cancels and awaits any prior
    /// worker, then spawns a fresh one. The source itself is opened on the
    /// worker thread; open failures surface from
    /// [`run_to_completion`](Self::run_to_completion).
    pub fn start(&mut self, request: ConversionRequest) -> Result<(), SessionError> {
        let kind = MediaKind::of_path(&request.path);
        let loop_mode = request.loop_override.unwrap_or(kind.default_loop_mode());
        let path = request.path;
        let width = request.width;
        let settings = WorkerSettings {
            width,
            palette: request.palette,
            mode: request.mode,
        };
        self.start_with_source(move || open_media(&path, width), kind, loop_mode, settings)
    }

    /// [`start`](Self::start) with a caller-supplied source opener, for
    /// decoders this crate does not know about.
    pub fn start_with_source<F>(
        &mut self,
        open: F,
        kind: MediaKind,
        loop_mode: LoopMode,
        settings: WorkerSettings,
    ) -> Result<(), SessionError>
    where
        F: FnOnce() -> Result<Box<dyn MediaSource + Send>, SourceError> + Send + 'static,
    {
        if settings.width == 0 {
            return Err(ValidationError::ZeroWidth.into());
        }
        // At most one worker per session: the prior one is cancelled and
        // awaited before the new one spawns.
        self.stop();
        self.worker = Some(worker::spawn(open, settings));
        self.pending = Some(PendingRun { kind, loop_mode });
        Ok(())
    }

    /// Blocks until the active worker reaches its terminal state, feeding
    /// each [`ProgressEvent`] to `on_progress`.
    ///
    /// Returns [`SessionOutcome::Cancelled`] when no conversion is active.
    pub fn run_to_completion<F>(&mut self, mut on_progress: F) -> Result<SessionOutcome, SessionError>
    where
        F: FnMut(&ProgressEvent),
    {
        let Some(handle) = self.worker.take() else {
            return Ok(SessionOutcome::Cancelled);
        };
        let pending = self.pending.take();

        let outcome = loop {
            match handle.events().recv() {
                Ok(WorkerEvent::Progress(progress)) => on_progress(&progress),
                Ok(WorkerEvent::Finished(sequence)) => break WorkerOutcome::Finished(sequence),
                Ok(WorkerEvent::Failed(err)) => break WorkerOutcome::Failed(err),
                Ok(WorkerEvent::Cancelled) | Err(_) => break WorkerOutcome::Cancelled,
            }
        };
        // Terminal event already seen; join only reaps the thread.
        let _ = handle.join();

        match outcome {
            WorkerOutcome::Failed(err) => Err(err.into()),
            WorkerOutcome::Cancelled => Ok(SessionOutcome::Cancelled),
            WorkerOutcome::Finished(sequence) => {
                if sequence.is_empty() {
                    return Err(SessionError::EmptySequence);
                }
                let pending = pending.unwrap_or(PendingRun {
                    kind: MediaKind::Video,
                    loop_mode: LoopMode::Once,
                });
                if pending.kind.is_still() {
                    match sequence.into_frames().into_iter().next() {
                        Some(frame) => Ok(SessionOutcome::Still(frame)),
                        None => Err(SessionError::EmptySequence),
                    }
                } else {
                    Ok(SessionOutcome::Motion(PlaybackSession::begin(
                        sequence,
                        pending.loop_mode,
                    )))
                }
            }
        }
    }

    /// Cancels any active worker and awaits its terminal state. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.worker.take() {
            handle.request_cancel();
            let _ = handle.join();
        }
        self.pending = None;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

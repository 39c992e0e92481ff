//! Timed playback: maps elapsed wall-clock time to a frame index.
//!
//! An external timer drives [`PlaybackSession::tick`] periodically (15 ms
//! or faster is plenty); the tick itself never blocks and only signals a
//! display update when the computed index actually changes. Skipped
//! indices are never rendered — a late tick jumps straight to the current
//! frame, matching real-time playback.

use std::time::Instant;

use crate::render::FrameSequence;

/// Whether playback wraps at the end of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play through once, then signal end of playback.
    Once,
    /// Wrap with `index mod len`; requires a non-empty sequence.
    Loop,
}

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A new frame should be displayed.
    Show(usize),
    /// The current frame is still the right one; nothing to do.
    Hold,
    /// Terminal: playback ran past the last frame in [`LoopMode::Once`].
    Ended,
}

/// One active playback of a completed frame sequence.
///
/// Created when playback starts, mutated only by [`tick`] advancing the
/// last-shown index, dropped on stop.
///
/// [`tick`]: PlaybackSession::tick
#[derive(Debug)]
pub struct PlaybackSession {
    sequence: FrameSequence,
    loop_mode: LoopMode,
    started: Instant,
    last_shown: Option<usize>,
}

impl PlaybackSession {
    /// Starts playback now.
    pub fn begin(sequence: FrameSequence, loop_mode: LoopMode) -> Self {
        Self::with_start(sequence, loop_mode, Instant::now())
    }

    /// Starts playback with an explicit start timestamp.
    pub fn with_start(sequence: FrameSequence, loop_mode: LoopMode, started: Instant) -> Self {
        Self {
            sequence,
            loop_mode,
            started,
            last_shown: None,
        }
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Computes the frame for `now`.
    ///
    /// `raw = floor(elapsed_secs * fps)`; in [`LoopMode::Once`] an index at
    /// or past the end is terminal, in [`LoopMode::Loop`] it wraps. `Show`
    /// is emitted only when the index differs from the last one shown, so
    /// ticks faster than the frame rate cost nothing.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let length = self.sequence.len();
        if length == 0 {
            // Zero-length sequences never reach playback; terminal anyway.
            return Tick::Ended;
        }

        let elapsed = now.saturating_duration_since(self.started);
        let raw_index = (elapsed.as_secs_f64() * self.sequence.frame_rate()).floor() as usize;

        let frame_index = match self.loop_mode {
            LoopMode::Once if raw_index >= length => return Tick::Ended,
            LoopMode::Once => raw_index,
            LoopMode::Loop => raw_index % length,
        };

        if self.last_shown == Some(frame_index) {
            return Tick::Hold;
        }
        self.last_shown = Some(frame_index);
        Tick::Show(frame_index)
    }
}

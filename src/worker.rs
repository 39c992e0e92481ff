//! Background preprocessing worker.
//!
//! One worker turns a media source into a complete [`FrameSequence`] on a
//! dedicated thread, emitting a [`ProgressEvent`] per processed frame and
//! exactly one terminal event per run. Cancellation is cooperative: the
//! foreground flips an atomic flag, the worker polls it once per frame
//! between source reads, and a frame already mid-render is never aborted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::error::SourceError;
use crate::palette::{ColorMode, GlyphPalette};
use crate::render::{render_frame, FrameSequence};
use crate::source::MediaSource;

/// Fallback frame rate when the source reports an unknown (`<= 0`) rate.
pub const DEFAULT_FRAME_RATE: f64 = 24.0;

/// Per-frame progress: frames processed so far and the expected total
/// (`0` when the source cannot know it ahead of decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
}

impl ProgressEvent {
    /// Percentage complete, `0.0` while the total is unknown.
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            self.processed as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Event stream of one worker run: any number of `Progress` events followed
/// by exactly one terminal event.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress(ProgressEvent),
    /// Source exhausted; carries the complete (possibly empty) sequence.
    Finished(FrameSequence),
    /// The source never opened.
    Failed(SourceError),
    /// Cooperative stop observed; the partial sequence is discarded.
    Cancelled,
}

/// Terminal state of a worker run, as seen after draining its events.
#[derive(Debug)]
pub enum WorkerOutcome {
    Finished(FrameSequence),
    Failed(SourceError),
    Cancelled,
}

/// Conversion parameters the worker applies to every frame.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub width: u32,
    pub palette: GlyphPalette,
    pub mode: ColorMode,
}

/// Handle to a running preprocessing worker.
pub struct WorkerHandle {
    cancel: Arc<AtomicBool>,
    events: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Requests a cooperative stop; observed at the worker's next per-frame
    /// check.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Event stream for progress display while the worker runs.
    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.events
    }

    /// Drains events until the terminal one and joins the thread,
    /// discarding intermediate progress.
    pub fn join(mut self) -> WorkerOutcome {
        let outcome = loop {
            match self.events.recv() {
                Ok(WorkerEvent::Progress(_)) => {}
                Ok(WorkerEvent::Finished(sequence)) => break WorkerOutcome::Finished(sequence),
                Ok(WorkerEvent::Failed(err)) => break WorkerOutcome::Failed(err),
                Ok(WorkerEvent::Cancelled) | Err(_) => break WorkerOutcome::Cancelled,
            }
        };
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        outcome
    }
}

/// Spawns a worker that opens the source on its own thread and renders
/// every frame in strict source order.
///
/// The opener runs on the worker thread so slow container probing never
/// blocks the caller; an open failure becomes the `Failed` terminal event.
pub fn spawn<F>(open: F, settings: WorkerSettings) -> WorkerHandle
where
    F: FnOnce() -> Result<Box<dyn MediaSource + Send>, SourceError> + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let (sender, events) = crossbeam_channel::unbounded();
    let flag = Arc::clone(&cancel);
    let thread = thread::spawn(move || run(open, settings, &flag, &sender));
    WorkerHandle {
        cancel,
        events,
        thread: Some(thread),
    }
}

fn run<F>(open: F, settings: WorkerSettings, cancel: &AtomicBool, events: &Sender<WorkerEvent>)
where
    F: FnOnce() -> Result<Box<dyn MediaSource + Send>, SourceError>,
{
    let mut source = match open() {
        Ok(source) => source,
        Err(err) => {
            log::warn!("preprocessing failed to open source: {err}");
            let _ = events.send(WorkerEvent::Failed(err));
            return;
        }
    };

    let total = source.total_frames();
    let mut frames = Vec::new();
    let mut processed = 0usize;

    loop {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("preprocessing cancelled after {processed} frames");
            let _ = events.send(WorkerEvent::Cancelled);
            return;
        }
        let Some(frame) = source.next_frame() else {
            break;
        };
        match render_frame(frame, settings.width, &settings.palette, settings.mode) {
            Ok(rendered) => frames.push(rendered),
            Err(err) => {
                // A frame with no extent reads as end-of-source; frames
                // rendered so far stay usable.
                log::warn!("skipping remainder of source: {err}");
                break;
            }
        }
        processed += 1;
        let _ = events.send(WorkerEvent::Progress(ProgressEvent { processed, total }));
    }

    let reported = source.frame_rate();
    let frame_rate = if reported > 0.0 { reported } else { DEFAULT_FRAME_RATE };
    log::debug!("preprocessing finished: {processed} frames at {frame_rate} fps");
    let _ = events.send(WorkerEvent::Finished(FrameSequence::new(frames, frame_rate)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};
    use image::RgbImage;

    fn settings() -> WorkerSettings {
        WorkerSettings {
            width: 2,
            palette: GlyphPalette::new("@ ").unwrap(),
            mode: ColorMode::Monochrome,
        }
    }

    fn solid(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(4, 4, image::Rgb(rgb))
    }

    /// Fixed list of frames with a reported rate and total.
    struct ListSource {
        frames: std::vec::IntoIter<RgbImage>,
        frame_rate: f64,
        total: usize,
    }

    impl ListSource {
        fn boxed(frames: Vec<RgbImage>, frame_rate: f64, total: usize) -> Box<dyn MediaSource + Send> {
            Box::new(Self {
                frames: frames.into_iter(),
                frame_rate,
                total,
            })
        }
    }

    impl MediaSource for ListSource {
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

    /// Source fed one frame at a time over a channel, so tests control
    /// exactly when the worker can make progress.
    struct FedSource {
        feed: Receiver<Option<RgbImage>>,
    }

    impl MediaSource for FedSource {
        fn frame_rate(&self) -> f64 {
            0.0
        }
        fn total_frames(&self) -> usize {
            0
        }
        fn next_frame(&mut self) -> Option<RgbImage> {
            self.feed.recv().ok().flatten()
        }
    }

    #[test]
    fn renders_all_frames_in_order_with_progress() {
        let frames = vec![solid([0, 0, 0]), solid([255, 255, 255]), solid([0, 0, 0])];
        let handle = spawn(move || Ok(ListSource::boxed(frames, 30.0, 3)), settings());

        let mut progress = Vec::new();
        let sequence = loop {
            match handle.events().recv().unwrap() {
                WorkerEvent::Progress(p) => progress.push(p),
                WorkerEvent::Finished(sequence) => break sequence,
                other => panic!("unexpected event {other:?}"),
            }
        };

        assert_eq!(
            progress,
            vec![
                ProgressEvent { processed: 1, total: 3 },
                ProgressEvent { processed: 2, total: 3 },
                ProgressEvent { processed: 3, total: 3 },
            ]
        );
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.frame_rate(), 30.0);
        assert_eq!(sequence.get(0).unwrap().rows()[0][0].glyph, '@');
        assert_eq!(sequence.get(1).unwrap().rows()[0][0].glyph, ' ');
        assert_eq!(sequence.get(2).unwrap().rows()[0][0].glyph, '@');
    }

    #[test]
    fn unknown_total_reports_zero() {
        let frames = vec![solid([9, 9, 9])];
        let handle = spawn(move || Ok(ListSource::boxed(frames, 10.0, 0)), settings());
        match handle.events().recv().unwrap() {
            WorkerEvent::Progress(p) => assert_eq!(p, ProgressEvent { processed: 1, total: 0 }),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn empty_source_finishes_with_empty_sequence() {
        let handle = spawn(|| Ok(ListSource::boxed(Vec::new(), 0.0, 0)), settings());
        match handle.join() {
            WorkerOutcome::Finished(sequence) => assert!(sequence.is_empty()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn unknown_frame_rate_falls_back_to_default() {
        let frames = vec![solid([1, 1, 1])];
        let handle = spawn(move || Ok(ListSource::boxed(frames, -1.0, 1)), settings());
        match handle.join() {
            WorkerOutcome::Finished(sequence) => {
                assert_eq!(sequence.frame_rate(), DEFAULT_FRAME_RATE);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn open_failure_is_the_failed_terminal_event() {
        let handle = spawn(
            || {
                Err(SourceError::Open {
                    path: "missing.mp4".into(),
                    reason: "no such file".into(),
                })
            },
            settings(),
        );
        assert!(matches!(handle.join(), WorkerOutcome::Failed(_)));
    }

    #[test]
    fn cancel_before_first_frame_yields_cancelled() {
        // Hold the opener until the cancel flag is already set, so the very
        // first per-frame check observes it.
        let (release, gate) = bounded::<()>(0);
        let handle = spawn(
            move || {
                let _ = gate.recv();
                Ok(ListSource::boxed(vec![solid([0, 0, 0])], 10.0, 1))
            },
            settings(),
        );
        handle.request_cancel();
        release.send(()).unwrap();
        assert!(matches!(handle.join(), WorkerOutcome::Cancelled));
    }

    #[test]
    fn cancel_mid_stream_discards_the_partial_sequence() {
        let (feed, frames) = unbounded();
        let handle = spawn(
            move || Ok(Box::new(FedSource { feed: frames }) as Box<dyn MediaSource + Send>),
            settings(),
        );

        feed.send(Some(solid([0, 0, 0]))).unwrap();
        match handle.events().recv().unwrap() {
            WorkerEvent::Progress(p) => assert_eq!(p.processed, 1),
            other => panic!("unexpected event {other:?}"),
        }

        handle.request_cancel();
        // The worker may already have observed the flag and hung up.
        let _ = feed.send(Some(solid([255, 255, 255])));
        // No Finished event may follow a cancel request; the run ends in
        // Cancelled and the frames rendered so far are never exposed.
        assert!(matches!(handle.join(), WorkerOutcome::Cancelled));
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// The media source could not be opened or decoded at all.
///
/// No partial output exists when this is returned; the caller should not
/// attempt playback.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("external decoder failed for {path}: {reason}")]
    Decoder { path: PathBuf, reason: String },
}

impl SourceError {
    pub(crate) fn open(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decoder(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Decoder {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Bad conversion parameters, rejected before any decode or render work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("glyph palette must contain at least one glyph")]
    EmptyPalette,
    #[error("target width must be greater than zero")]
    ZeroWidth,
    #[error("source frame has zero width or height")]
    EmptyFrame,
}

/// Discriminated failure outcome of one conversion session.
///
/// Cancellation is deliberately not represented here: a cooperative stop is
/// a normal terminal state, reported as [`SessionOutcome::Cancelled`].
///
/// [`SessionOutcome::Cancelled`]: crate::session::SessionOutcome::Cancelled
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The source opened but yielded zero usable frames. Distinct from
    /// [`SessionError::Source`] so the caller can skip playback start
    /// instead of reporting a decode failure.
    #[error("source yielded no frames")]
    EmptySequence,
}

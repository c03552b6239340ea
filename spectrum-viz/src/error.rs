use thiserror::Error;

/// Conditions that abort a single tick.
///
/// Both are expected transients under concurrent resize/config races: the
/// analyzer catches them at the tick boundary and silently skips the frame,
/// so they can never take the render loop down.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The bucket table references bins past the end of the current frame.
    #[error("magnitude frame too short: bucket table needs {needed} bins, frame has {available}")]
    FrameTooShort { needed: usize, available: usize },
    /// The bucket table failed its monotonicity check and must be rebuilt.
    #[error("bucket boundary table is not monotonic")]
    CorruptBoundaries,
}

use thiserror::Error;

/// Precondition violations raised synchronously by the wheel core.
///
/// None of these are retried or silently corrected: clamping a bad index or
/// ignoring a double start would let the animation contradict the externally
/// decided outcome, or leak a frame loop.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WheelError {
    #[error("target index {index} out of range for wheel with {count} sectors")]
    InvalidIndex { index: usize, count: usize },
    #[error("wheel has no sectors")]
    EmptyWheel,
    #[error("a spin is already in progress")]
    AlreadySpinning,
}

pub type Result<T> = std::result::Result<T, WheelError>;

//! Error types for loop-tag parsing.

use thiserror::Error;

/// Errors produced while locating and decoding a loop-point comment.
///
/// `NotFound` is a soft outcome: the stream is well formed but carries no
/// recognized loop key. Callers decide whether that means "play without
/// looping" or "refuse to open". Everything else is fatal for the parse.
#[derive(Debug, Error)]
pub enum LoopTagError {
    /// The byte stream failed or ended in the middle of a field.
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Container framing did not match the format specification.
    #[error("malformed container: {0}")]
    Format(&'static str),

    /// A loop comment was located but its content is unusable.
    #[error("corrupted loop tag: {0}")]
    Corrupted(&'static str),

    /// No recognized loop comment is present in the stream.
    #[error("no loop tag found")]
    NotFound,
}

/// Result type for tag-parsing operations.
pub type TagResult<T> = Result<T, LoopTagError>;

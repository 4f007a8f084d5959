//! Loop-point aware background-music streaming.
//!
//! This crate does two things: it locates a vendor-specific loop-point
//! directive (`OHMSSP*` comment keys) in the metadata of an Ogg Vorbis or
//! FLAC container, and it drives sample-accurate, gapless looped playback
//! over a decoded PCM stream using that window. Decoding compressed audio
//! and talking to an output device are left to external collaborators; see
//! [`play::PcmSource`].

pub mod error;
pub mod play;
pub mod stream;
pub mod tag;

pub use error::{LoopTagError, TagResult};
pub use play::{Chunk, ChunkOutcome, LoopSpan, LoopStream, MissingTagPolicy, PcmSource};
pub use tag::{read_loop_points, LoopPoints};

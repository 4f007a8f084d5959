//! Loop-aware streaming playback support.
//!
//! The controller in [`controller`] sits between a decoded PCM source and a
//! generic chunk-pulling player (an audio device callback, typically). It
//! never decodes compressed audio itself; the source collaborator does that.

pub mod controller;

pub use controller::{
    samples_to_micros, time_to_samples, Chunk, ChunkOutcome, LoopSpan, LoopStream,
    MissingTagPolicy,
};

/// A decoded PCM stream, as supplied by an external decoder.
///
/// Sample positions are in interleaved sample units (one `i16` per channel
/// per frame). `read` fills as much of the buffer as it can and reports how
/// many samples it produced; zero means the true end of the stream. `seek`
/// repositions decoding to an absolute sample offset.
pub trait PcmSource: Send {
    /// Number of interleaved channels.
    fn channel_count(&self) -> u32;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Total interleaved sample count of the stream.
    fn sample_count(&self) -> u64;

    /// Decode up to `buf.len()` samples into `buf`, returning the count
    /// actually produced.
    fn read(&mut self, buf: &mut [i16]) -> usize;

    /// Reposition decoding to the given absolute sample offset.
    fn seek(&mut self, sample_offset: u64);
}

//! Loop streaming controller.
//!
//! Turns a `[start, start + length)` sample window into seamless, infinite
//! looped playback over a pull-based PCM source. The controller clamps each
//! chunk request so the decoder is never asked for samples past the loop
//! boundary, then tells the caller whether to keep pulling, wrap back to the
//! loop start, or stop.

use std::io::{Read, Seek};

use log::warn;
use parking_lot::Mutex;

use crate::error::{LoopTagError, TagResult};
use crate::play::PcmSource;
use crate::tag::{read_loop_points, LoopPoints};

/// Loop window in interleaved sample units. `length == 0` means looping is
/// disabled and playback runs through to the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSpan {
    pub offset: u64,
    pub length: u64,
}

impl LoopSpan {
    /// First sample past the loop window, saturating at `u64::MAX`.
    ///
    /// Spans built by the controller always fit the stream, but a raw
    /// descriptor can carry `offset + length` past `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// Whether the span describes a usable loop.
    pub fn is_active(&self) -> bool {
        self.length != 0
    }
}

/// What to do when a stream carries no recognized loop comment.
///
/// Two policies exist because both behaviors are legitimate: background
/// music players usually refuse files without loop metadata, while generic
/// players fall back to straight-through playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTagPolicy {
    /// Propagate `NotFound` to the caller.
    Fail,
    /// Open the stream with looping disabled.
    PlayUnlooped,
}

/// What the caller should do after a `fill_chunk` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Keep pulling chunks.
    Continue,
    /// The loop boundary was reached; call
    /// [`LoopStream::on_loop_boundary`] and keep pulling.
    Loop,
    /// The stream ended; stop pulling.
    End,
}

/// Result of one `fill_chunk` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Interleaved samples written to the buffer.
    pub produced: usize,
    pub outcome: ChunkOutcome,
}

/// Convert a microsecond position to an interleaved sample offset,
/// rounding to nearest.
///
/// Computed entirely in integer arithmetic; loop boundaries are compared in
/// sample units, so this rounding must be stable across every
/// time-to-sample conversion in the player. The intermediate product is
/// widened to 128 bits and results past `u64::MAX` saturate, so a
/// well-formed tag with an absurd position cannot panic.
pub fn time_to_samples(micros: u64, sample_rate: u32, channel_count: u32) -> u64 {
    let samples =
        (micros as u128 * sample_rate as u128 * channel_count as u128 + 500_000) / 1_000_000;
    u64::try_from(samples).unwrap_or(u64::MAX)
}

/// Inverse of [`time_to_samples`], truncating. Saturates at `u64::MAX`.
pub fn samples_to_micros(samples: u64, sample_rate: u32, channel_count: u32) -> u64 {
    let per_second = sample_rate as u128 * channel_count as u128;
    if per_second == 0 {
        return 0;
    }
    let micros = samples as u128 * 1_000_000 / per_second;
    u64::try_from(micros).unwrap_or(u64::MAX)
}

struct State<S> {
    source: S,
    span: LoopSpan,
    offset: u64,
    looping: bool,
}

/// Loop-aware streaming front end over a [`PcmSource`].
///
/// The stream properties (channel count, sample rate, total sample count)
/// are read from the source once at construction and fixed thereafter.
/// Mutable playback state lives behind a single lock so the device callback
/// pulling chunks and a control thread seeking or stopping never interleave;
/// the lock is only ever held across the bounded read/compute/advance
/// section of one call.
pub struct LoopStream<S: PcmSource> {
    channel_count: u32,
    sample_rate: u32,
    total_samples: u64,
    state: Mutex<State<S>>,
}

impl<S: PcmSource> LoopStream<S> {
    /// Wrap a decoded source with an optional loop descriptor.
    ///
    /// A zero-length window, a window starting at or past the end of the
    /// stream, or a source with no channels or samples all disable looping
    /// rather than failing: they are plausible results of an absent or
    /// zero-filled tag, not corruption. A window overrunning the end is
    /// truncated.
    pub fn new(source: S, points: Option<LoopPoints>) -> Self {
        let channel_count = source.channel_count();
        let sample_rate = source.sample_rate();
        let total_samples = source.sample_count();

        let span = resolve_span(points, sample_rate, channel_count, total_samples);
        LoopStream {
            channel_count,
            sample_rate,
            total_samples,
            state: Mutex::new(State {
                source,
                span,
                offset: 0,
                looping: span.is_active(),
            }),
        }
    }

    /// Read the loop comment from a container stream and wrap `source`.
    ///
    /// `reader` holds the compressed container (for the tag scan); `source`
    /// is the decoder opened over the same data. `policy` decides whether a
    /// missing tag fails the open or degrades to unlooped playback; all
    /// other tag errors always fail.
    pub fn from_tag<R: Read + Seek>(
        reader: &mut R,
        source: S,
        policy: MissingTagPolicy,
    ) -> TagResult<Self> {
        match read_loop_points(reader) {
            Ok(points) => Ok(Self::new(source, Some(points))),
            Err(LoopTagError::NotFound) if policy == MissingTagPolicy::PlayUnlooped => {
                warn!("no loop tag found, playing without looping");
                Ok(Self::new(source, None))
            }
            Err(err) => Err(err),
        }
    }

    /// Pull the next chunk of decoded samples into `buf`.
    ///
    /// When looping is active and the current position would cross the loop
    /// end inside this chunk, the request is clamped to land exactly on the
    /// boundary - the decoder is never asked for samples past it. The
    /// returned outcome tells the caller whether to continue, wrap via
    /// [`on_loop_boundary`](Self::on_loop_boundary), or stop.
    pub fn fill_chunk(&self, buf: &mut [i16]) -> Chunk {
        let mut state = self.state.lock();
        let span = state.span;
        let loop_end = span.end();

        let mut to_fill = buf.len() as u64;
        if state.looping && span.is_active() && state.offset <= loop_end {
            to_fill = to_fill.min(loop_end - state.offset);
        }

        let produced = state.source.read(&mut buf[..to_fill as usize]);
        state.offset += produced as u64;

        let outcome = if produced == 0 {
            ChunkOutcome::End
        } else if state.looping && span.is_active() && state.offset == loop_end {
            ChunkOutcome::Loop
        } else if state.offset >= self.total_samples {
            ChunkOutcome::End
        } else {
            ChunkOutcome::Continue
        };

        Chunk { produced, outcome }
    }

    /// Wrap playback back to the loop start. Returns the new sample offset,
    /// which is always the span's offset.
    pub fn on_loop_boundary(&self) -> u64 {
        let mut state = self.state.lock();
        let target = state.span.offset;
        state.source.seek(target);
        state.offset = target;
        target
    }

    /// Reposition playback to a microsecond offset.
    pub fn on_seek(&self, micros: u64) {
        let target =
            time_to_samples(micros, self.sample_rate, self.channel_count).min(self.total_samples);
        let mut state = self.state.lock();
        state.source.seek(target);
        state.offset = target;
    }

    /// Stop playback, rewinding to the start of the stream.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.source.seek(0);
        state.offset = 0;
    }

    /// Enable or disable looping without touching the span.
    pub fn set_looping(&self, looping: bool) {
        self.state.lock().looping = looping;
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    /// The resolved loop window, in interleaved samples.
    pub fn loop_span(&self) -> LoopSpan {
        self.state.lock().span
    }

    /// Loop window endpoints in microseconds, `(start, end)`.
    pub fn loop_window_micros(&self) -> (u64, u64) {
        let span = self.loop_span();
        (
            samples_to_micros(span.offset, self.sample_rate, self.channel_count),
            samples_to_micros(span.end(), self.sample_rate, self.channel_count),
        )
    }

    /// Current playback position in microseconds.
    pub fn playing_offset_micros(&self) -> u64 {
        let offset = self.state.lock().offset;
        samples_to_micros(offset, self.sample_rate, self.channel_count)
    }

    /// Total stream duration in microseconds.
    pub fn duration_micros(&self) -> u64 {
        samples_to_micros(self.total_samples, self.sample_rate, self.channel_count)
    }

    pub fn channel_count(&self) -> u32 {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn sample_count(&self) -> u64 {
        self.total_samples
    }
}

/// Derive the sample-domain loop window from a parsed descriptor.
fn resolve_span(
    points: Option<LoopPoints>,
    sample_rate: u32,
    channel_count: u32,
    total_samples: u64,
) -> LoopSpan {
    let Some(points) = points else {
        return LoopSpan::default();
    };

    if channel_count == 0 || total_samples == 0 {
        warn!("source reports no channels or samples, looping disabled");
        return LoopSpan::default();
    }

    let mut span = match points {
        LoopPoints::Samples { start, length } => LoopSpan {
            offset: start,
            length,
        },
        LoopPoints::Micros { start, length } => LoopSpan {
            offset: time_to_samples(start, sample_rate, channel_count),
            length: time_to_samples(length, sample_rate, channel_count),
        },
    };

    if !span.is_active() || span.offset >= total_samples {
        if span.offset >= total_samples {
            warn!("loop offset {} is past the end of the stream", span.offset);
        }
        return LoopSpan::default();
    }
    if span.end() > total_samples {
        span.length = total_samples - span.offset;
    }
    span
}

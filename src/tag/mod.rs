//! Loop-point comment extraction from Ogg Vorbis and FLAC containers.
//!
//! The front door is [`read_loop_points`], which sniffs the container magic
//! and hands the stream to the matching walker. Both walkers funnel their
//! located comment list through the shared scanner in [`comment`] and the
//! value parser in [`descriptor`].

pub mod comment;
pub mod descriptor;
pub mod flac;
pub mod ogg;

use std::io::{Read, Seek, SeekFrom};

use crate::error::{LoopTagError, TagResult};

pub use comment::{find_loop_entry, CommentFraming, LOOP_KEY_PREFIX};
pub use descriptor::{parse_loop_value, LoopPoints, KEY_MICROS, KEY_SAMPLES};
pub use flac::parse_flac_comment;
pub use ogg::parse_ogg_comment;

/// Extract the loop descriptor from an Ogg Vorbis or FLAC stream.
///
/// Rewinds the stream, sniffs the 4-byte container magic and runs the
/// matching tag scan, then decodes the located `KEY=VALUE` pair. The stream
/// cursor is left wherever the scan stopped; callers that go on to decode
/// audio from the same stream should rewind it first.
pub fn read_loop_points<R: Read + Seek>(reader: &mut R) -> TagResult<LoopPoints> {
    reader.seek(SeekFrom::Start(0)).map_err(LoopTagError::Io)?;
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(LoopTagError::Io)?;
    reader.seek(SeekFrom::Start(0)).map_err(LoopTagError::Io)?;

    let (key, value) = match &magic {
        m if m == ogg::OGG_MAGIC => parse_ogg_comment(reader)?,
        m if m == flac::FLAC_MAGIC => parse_flac_comment(reader)?,
        _ => return Err(LoopTagError::Format("unrecognized container magic")),
    };

    parse_loop_value(&key, &value)
}

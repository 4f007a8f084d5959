//! Vorbis comment-list scanning.
//!
//! Both containers carry the same `KEY=VALUE` list encoding: a 32-bit
//! little-endian vendor length, the vendor bytes (skipped, not validated), a
//! 32-bit little-endian entry count, then that many length-prefixed entries.
//! The scanner extracts the single entry whose key starts with the reserved
//! loop prefix and validates that the list consumes its region exactly.

use log::debug;

use crate::error::{LoopTagError, TagResult};

/// Reserved key prefix for loop-point comments (case-sensitive).
pub const LOOP_KEY_PREFIX: &str = "OHMSSP";

/// How the comment list is terminated in its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentFraming {
    /// Ogg comment packets end with a single 0x01 framing byte.
    OggPacket,
    /// FLAC VORBIS_COMMENT blocks end exactly at the declared block length.
    FlacBlock,
}

/// Scan a raw comment-list blob for the one `OHMSSP*` entry.
///
/// Returns `Ok(None)` when no entry matches the prefix; that is a soft
/// outcome, not an error. Two matching entries make the tag unusable and are
/// reported as `Corrupted`. Entries without a `=` separator are skipped.
pub fn find_loop_entry(
    data: &[u8],
    framing: CommentFraming,
) -> TagResult<Option<(String, String)>> {
    let mut pos = 0usize;

    let vendor_len = read_le_u32_at(data, &mut pos, "comment vendor length truncated")? as usize;
    advance(data, &mut pos, vendor_len, "comment vendor string truncated")?;

    let entry_count = read_le_u32_at(data, &mut pos, "comment entry count truncated")?;

    let mut found: Option<(String, String)> = None;
    for _ in 0..entry_count {
        let entry_len = read_le_u32_at(data, &mut pos, "comment entry length truncated")? as usize;
        let start = pos;
        advance(data, &mut pos, entry_len, "comment entry truncated")?;
        let entry = String::from_utf8_lossy(&data[start..pos]);

        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        if !key.starts_with(LOOP_KEY_PREFIX) {
            continue;
        }
        if found.is_some() {
            return Err(LoopTagError::Corrupted("redundant loop tag entries"));
        }
        debug!("loop comment entry: {}={}", key, value);
        found = Some((key.to_owned(), value.to_owned()));
    }

    // The list must land exactly on its terminator; anything else means a
    // truncated or over-length entry slipped through.
    match framing {
        CommentFraming::OggPacket => {
            if pos != data.len().wrapping_sub(1) || data[pos] != 0x01 {
                return Err(LoopTagError::Format("bad comment framing byte"));
            }
        }
        CommentFraming::FlacBlock => {
            if pos != data.len() {
                return Err(LoopTagError::Format("comment list does not fill its block"));
            }
        }
    }

    Ok(found)
}

fn read_le_u32_at(data: &[u8], pos: &mut usize, what: &'static str) -> TagResult<u32> {
    let end = pos.checked_add(4).ok_or(LoopTagError::Format(what))?;
    let bytes = data.get(*pos..end).ok_or(LoopTagError::Format(what))?;
    *pos = end;
    Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
}

fn advance(data: &[u8], pos: &mut usize, len: usize, what: &'static str) -> TagResult<()> {
    let end = pos.checked_add(len).ok_or(LoopTagError::Format(what))?;
    if end > data.len() {
        return Err(LoopTagError::Format(what));
    }
    *pos = end;
    Ok(())
}

//! FLAC metadata-block scanning.
//!
//! FLAC fronts its stream with a chain of metadata blocks: a 1-byte header
//! whose high bit flags the final block and whose low 7 bits carry the type,
//! then a 24-bit big-endian payload length. Type 4 is VORBIS_COMMENT and
//! reuses the Ogg comment-list encoding, minus the trailing framing byte.

use std::io::{Read, Seek};

use log::debug;

use crate::error::{LoopTagError, TagResult};
use crate::stream;
use crate::tag::comment::{find_loop_entry, CommentFraming};

/// FLAC stream marker.
pub const FLAC_MAGIC: &[u8; 4] = b"fLaC";

/// Metadata block type carrying the comment list.
const BLOCK_VORBIS_COMMENT: u8 = 4;

#[derive(Debug)]
struct BlockHeader {
    is_last: bool,
    block_type: u8,
    length: u32,
}

impl BlockHeader {
    fn read<R: Read>(reader: &mut R) -> TagResult<Self> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).map_err(LoopTagError::Io)?;
        Ok(BlockHeader {
            is_last: buf[0] & 0x80 != 0,
            block_type: buf[0] & 0x7F,
            length: u32::from_be_bytes([0, buf[1], buf[2], buf[3]]),
        })
    }
}

/// Scan a FLAC stream for the single `OHMSSP*` loop comment.
///
/// Blocks other than VORBIS_COMMENT are skipped by length. A comment block
/// without a matching entry does not end the scan - another comment block
/// could still follow - but the last-block flag does, yielding `NotFound`.
pub fn parse_flac_comment<R: Read + Seek>(reader: &mut R) -> TagResult<(String, String)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(LoopTagError::Io)?;
    if &magic != FLAC_MAGIC {
        return Err(LoopTagError::Format("bad FLAC stream marker"));
    }

    loop {
        let header = BlockHeader::read(reader)?;

        if header.block_type == BLOCK_VORBIS_COMMENT {
            let block = stream::read_bytes(reader, header.length as usize)?;
            if let Some(hit) = find_loop_entry(&block, CommentFraming::FlacBlock)? {
                return Ok(hit);
            }
            debug!("flac comment block carries no loop tag");
        } else {
            debug!(
                "skipping flac block type {} ({} bytes)",
                header.block_type, header.length
            );
            stream::skip(reader, header.length as u64)?;
        }

        if header.is_last {
            return Err(LoopTagError::NotFound);
        }
    }
}

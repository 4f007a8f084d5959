//! Ogg comment-packet demuxing.
//!
//! Walks Ogg pages from the current stream position and reassembles logical
//! packets from the per-page segment tables (a 255-byte segment continues the
//! packet, any shorter segment terminates it; packets may span pages). Only
//! two kinds of packet are ever buffered: the start of each packet, which
//! must be read to learn its type byte, and a packet already identified as
//! the Vorbis comment header (type 3). Everything else - most notably the
//! large setup header - is skipped with a seek instead of copied.

use std::io::{Read, Seek};

use log::{debug, warn};

use crate::error::{LoopTagError, TagResult};
use crate::stream;
use crate::tag::comment::{find_loop_entry, CommentFraming};

/// Ogg page capture pattern.
pub const OGG_MAGIC: &[u8; 4] = b"OggS";

/// First payload byte of a Vorbis comment header packet.
const COMMENT_PACKET_TYPE: u8 = 0x03;
/// Codec signature following the packet type byte.
const VORBIS_SIGNATURE: &[u8; 6] = b"vorbis";

/// One Ogg page header, reduced to what drives the scan. The fixed fields
/// between the capture pattern and the segment count are consumed to keep
/// framing synchronized but not retained.
#[derive(Debug)]
struct OggPageHeader {
    page_sequence: u32,
    segment_table: Vec<u8>,
}

impl OggPageHeader {
    /// Read the next page header, or `None` on a clean end of stream.
    fn read<R: Read>(reader: &mut R) -> TagResult<Option<Self>> {
        let mut magic = [0u8; 4];
        if !stream::read_exact_or_eof(reader, &mut magic)? {
            return Ok(None);
        }
        if &magic != OGG_MAGIC {
            return Err(LoopTagError::Format("bad Ogg capture pattern"));
        }

        // version (1), header type (1), granule position (8), serial (4),
        // page sequence (4), checksum (4), segment count (1).
        let mut fixed = [0u8; 23];
        reader.read_exact(&mut fixed).map_err(LoopTagError::Io)?;
        let page_sequence = u32::from_le_bytes(fixed[14..18].try_into().unwrap());
        let segment_table = stream::read_bytes(reader, fixed[22] as usize)?;

        Ok(Some(OggPageHeader {
            page_sequence,
            segment_table,
        }))
    }
}

/// Scan an Ogg stream for the single `OHMSSP*` loop comment.
///
/// Reads from wherever the stream cursor currently is; callers wanting the
/// whole file must seek to its start first. The scan keeps going past a
/// comment packet that carries no matching entry, since malformed streams
/// may place an empty comment block before the real one. Running out of
/// pages without a hit is `NotFound`.
pub fn parse_ogg_comment<R: Read + Seek>(reader: &mut R) -> TagResult<(String, String)> {
    let mut packet: Vec<u8> = Vec::new();
    let mut is_comment_packet = false;

    loop {
        let Some(header) = OggPageHeader::read(reader)? else {
            return Err(LoopTagError::NotFound);
        };
        debug!(
            "ogg page {} with {} segments",
            header.page_sequence,
            header.segment_table.len()
        );

        for &segment_size in &header.segment_table {
            let size = segment_size as usize;

            // The first segment of a packet must be read to see the type
            // byte; after that only the comment packet is worth copying.
            if packet.is_empty() || is_comment_packet {
                let start = packet.len();
                packet.resize(start + size, 0);
                reader.read_exact(&mut packet[start..]).map_err(LoopTagError::Io)?;
                is_comment_packet =
                    is_comment_packet || packet.first() == Some(&COMMENT_PACKET_TYPE);
            } else {
                stream::skip(reader, size as u64)?;
                packet.resize(packet.len() + size, 0);
            }

            if segment_size == 0xFF {
                // Packet continues in the next segment, possibly on the
                // next page.
                continue;
            }

            // Packet terminated.
            if is_comment_packet {
                match comment_packet_entry(&packet)? {
                    Some(hit) => return Ok(hit),
                    None => warn!("ogg comment packet carries no loop tag, scanning on"),
                }
            }
            packet.clear();
            is_comment_packet = false;
        }
    }
}

/// Validate the `\x03vorbis` prefix and scan the comment list behind it.
///
/// A type-3 packet without the codec signature is not a comment header;
/// that is `None` so the page scan continues.
fn comment_packet_entry(packet: &[u8]) -> TagResult<Option<(String, String)>> {
    let Some(signature) = packet.get(1..7) else {
        return Ok(None);
    };
    if signature != VORBIS_SIGNATURE {
        return Ok(None);
    }
    find_loop_entry(&packet[7..], CommentFraming::OggPacket)
}

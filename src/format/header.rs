//! Depth frame header serialization and validation
//!
//! Every frame starts with a fixed 26-byte little-endian header followed by
//! the entropy-coded high stream and the video-coded low stream. There is
//! no trailer and no checksum; integrity relies on the inner codecs.
//!
//! ## Layout (Little Endian)
//!
//! | Offset | Size | Field                 | Description                          |
//! |--------|------|-----------------------|--------------------------------------|
//! | 0      | 1    | Magic                 | 0xCA                                 |
//! | 1      | 1    | Flags                 | bit 0 keyframe, bit 1 HEVC           |
//! | 2      | 2    | FrameNumber           | low 16 bits of the session counter   |
//! | 4      | 2    | Width                 | image width in pixels                |
//! | 6      | 2    | Height                | image height in pixels               |
//! | 8      | 2    | MinimumDepth          | min non-zero code before rescaling   |
//! | 10     | 2    | MaximumDepth          | max non-zero code before rescaling   |
//! | 12     | 4    | HighUncompressedBytes | high stream size after entropy decode|
//! | 16     | 4    | HighCompressedBytes   | high payload length in this frame    |
//! | 20     | 4    | LowCompressedBytes    | low payload length in this frame     |
//! | 24     | 1    | LowMinimum            | reserved, written as 0               |
//! | 25     | 1    | LowMaximum            | reserved, written as 0               |

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::video::VideoType;

/// First byte of the frame format
pub const DEPTH_FORMAT_MAGIC: u8 = 0xCA;

/// Number of bytes in the fixed header
pub const DEPTH_HEADER_BYTES: usize = 26;

/// Largest width or height the format can carry
pub const MAX_DIMENSION: u16 = 4096;

/// Header flag bits
pub mod flags {
    /// Frame is an IDR and starts a decodable sequence
    pub const KEYFRAME: u8 = 1 << 0;
    /// Low bits use HEVC instead of H.264
    pub const HEVC: u8 = 1 << 1;
}

/// Parsed form of the 26-byte frame header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthHeader {
    /// Flag bits, see [`flags`]
    pub flags: u8,
    /// Low 16 bits of the session frame counter; informational, may wrap
    pub frame_number: u16,
    /// Image width in pixels
    pub width: u16,
    /// Image height in pixels
    pub height: u16,
    /// Smallest non-zero quantized code, or 0 when the image has no readings
    pub minimum_depth: u16,
    /// Largest non-zero quantized code, or 0 when the image has no readings
    pub maximum_depth: u16,
    /// Expected high stream size after entropy decoding
    pub high_uncompressed_bytes: u32,
    /// Length of the entropy-coded high payload
    pub high_compressed_bytes: u32,
    /// Length of the video-coded low payload
    pub low_compressed_bytes: u32,
}

impl DepthHeader {
    /// Whether the keyframe flag is set
    pub fn is_keyframe(&self) -> bool {
        self.flags & flags::KEYFRAME != 0
    }

    /// Video codec type carried in the flags
    pub fn video_type(&self) -> VideoType {
        if self.flags & flags::HEVC != 0 {
            VideoType::H265
        } else {
            VideoType::H264
        }
    }

    /// Total frame length this header declares, header included
    pub fn total_bytes(&self) -> usize {
        DEPTH_HEADER_BYTES
            + self.high_compressed_bytes as usize
            + self.low_compressed_bytes as usize
    }

    /// Serialize to the 26-byte wire form. Reserved bytes are written as 0.
    pub fn to_bytes(&self) -> [u8; DEPTH_HEADER_BYTES] {
        let mut buf = [0u8; DEPTH_HEADER_BYTES];
        buf[0] = DEPTH_FORMAT_MAGIC;
        buf[1] = self.flags;
        LittleEndian::write_u16(&mut buf[2..4], self.frame_number);
        LittleEndian::write_u16(&mut buf[4..6], self.width);
        LittleEndian::write_u16(&mut buf[6..8], self.height);
        LittleEndian::write_u16(&mut buf[8..10], self.minimum_depth);
        LittleEndian::write_u16(&mut buf[10..12], self.maximum_depth);
        LittleEndian::write_u32(&mut buf[12..16], self.high_uncompressed_bytes);
        LittleEndian::write_u32(&mut buf[16..20], self.high_compressed_bytes);
        LittleEndian::write_u32(&mut buf[20..24], self.low_compressed_bytes);
        buf
    }

    /// Parse and validate a header against the full frame buffer.
    ///
    /// On any failure the typed error is returned and nothing is published
    /// to the caller. The reserved trailing bytes are ignored.
    pub fn parse(frame: &[u8]) -> Result<DepthHeader> {
        if frame.len() < DEPTH_HEADER_BYTES {
            return Err(Error::FileTruncated {
                need: DEPTH_HEADER_BYTES,
                have: frame.len(),
            });
        }
        if frame[0] != DEPTH_FORMAT_MAGIC {
            return Err(Error::WrongFormat { found: frame[0] });
        }

        let header = DepthHeader {
            flags: frame[1],
            frame_number: LittleEndian::read_u16(&frame[2..4]),
            width: LittleEndian::read_u16(&frame[4..6]),
            height: LittleEndian::read_u16(&frame[6..8]),
            minimum_depth: LittleEndian::read_u16(&frame[8..10]),
            maximum_depth: LittleEndian::read_u16(&frame[10..12]),
            high_uncompressed_bytes: LittleEndian::read_u32(&frame[12..16]),
            high_compressed_bytes: LittleEndian::read_u32(&frame[16..20]),
            low_compressed_bytes: LittleEndian::read_u32(&frame[20..24]),
        };

        if header.high_uncompressed_bytes < 2 {
            return Err(Error::corrupted(format!(
                "high stream claims {} uncompressed bytes",
                header.high_uncompressed_bytes
            )));
        }
        if frame.len() != header.total_bytes() {
            return Err(Error::FileTruncated {
                need: header.total_bytes(),
                have: frame.len(),
            });
        }
        if header.width < 1
            || header.width > MAX_DIMENSION
            || header.height < 1
            || header.height > MAX_DIMENSION
        {
            return Err(Error::corrupted(format!(
                "impossible dimensions {}x{}",
                header.width, header.height
            )));
        }

        Ok(header)
    }
}

/// Quick check that a buffer looks like a depth frame.
pub fn is_depth_frame(frame: &[u8]) -> bool {
    frame.len() >= DEPTH_HEADER_BYTES && frame[0] == DEPTH_FORMAT_MAGIC
}

/// Quick check that a buffer is a depth keyframe.
pub fn is_key_frame(frame: &[u8]) -> bool {
    is_depth_frame(frame) && frame[1] & flags::KEYFRAME != 0
}

//! Depth compression sessions
//!
//! A [`DepthCompressor`] owns everything a stream needs across frames: the
//! monotonic frame counter, the video coder context, and the scratch
//! buffers, which are retained between frames to avoid reallocation. The
//! same type serves both roles; a session is either encoding or decoding,
//! never both.
//!
//! Sequencing rules:
//!
//! - The first encoded frame of a session is always a keyframe, whatever
//!   the caller asked for. Keyframes carry the video coder's parameter
//!   sets, so nothing earlier is decodable.
//! - A decoder that has not yet decoded a keyframe rejects P-frames with
//!   [`Error::MissingFrame`].
//! - The frame counter only advances on success; on any decode error no
//!   partial image is published and the session state is unchanged.
//!
//! Encoding runs `encode_begin` on the video coder before entropy-coding
//! the high bits, then collects the coder output with `encode_finish`.
//! With an asynchronous coder the two halves overlap; with a blocking
//! coder the order is the same and only the overlap is lost.

use crate::codec::filter::{filter_image, unfilter_image};
use crate::codec::quantize::{dequantize_image, quantize_image};
use crate::codec::rescale::{rescale_image, unrescale_image};
use crate::entropy;
use crate::error::{Error, Result};
use crate::format::header::{flags, DepthHeader, DEPTH_HEADER_BYTES, MAX_DIMENSION};
use crate::video::{create_video_codec, VideoCodec, VideoParameters, VideoType};

/// Compressor/decompressor session for a single depth stream
pub struct DepthCompressor {
    frame_count: u64,
    quantized: Vec<u16>,
    high: Vec<u8>,
    low: Vec<u8>,
    high_out: Vec<u8>,
    low_out: Vec<u8>,
    codec: Option<Box<dyn VideoCodec>>,
    codec_type: Option<VideoType>,
    codec_pinned: bool,
}

impl DepthCompressor {
    /// Create a session that builds its video backend lazily from the
    /// codec type in use (the encode parameters, or the decode header).
    pub fn new() -> Self {
        DepthCompressor {
            frame_count: 0,
            quantized: Vec::new(),
            high: Vec::new(),
            low: Vec::new(),
            high_out: Vec::new(),
            low_out: Vec::new(),
            codec: None,
            codec_type: None,
            codec_pinned: false,
        }
    }

    /// Create a session with an injected video backend.
    ///
    /// The backend is used for every frame regardless of codec type; this
    /// is how an external HEVC coder (or the bit-exact
    /// [`RawVideoCodec`](crate::video::RawVideoCodec)) plugs in.
    pub fn with_video_codec(codec: Box<dyn VideoCodec>) -> Self {
        let mut session = Self::new();
        session.codec = Some(codec);
        session.codec_pinned = true;
        session
    }

    /// Number of successfully processed frames in this session.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Compress one depth image into a framed byte buffer.
    ///
    /// Set `keyframe` to make the frame decodable without prior frames;
    /// the first frame of a session is promoted to a keyframe regardless.
    ///
    /// Encoding has no failure modes visible to the caller: an internal
    /// coder failure is logged and yields a frame whose decode fails
    /// cleanly with [`Error::Corrupted`].
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are outside [1, 4096], if width*height is
    /// odd, or if `depth` does not hold exactly width*height values.
    /// These are programmer errors, not data errors.
    pub fn compress(&mut self, params: &VideoParameters, depth: &[u16], keyframe: bool) -> Vec<u8> {
        let width = params.width;
        let height = params.height;
        assert!(
            (1..=u32::from(MAX_DIMENSION)).contains(&width)
                && (1..=u32::from(MAX_DIMENSION)).contains(&height),
            "invalid dimensions {}x{}",
            width,
            height
        );
        let n = width as usize * height as usize;
        assert!(n % 2 == 0, "width*height must be even, got {}", n);
        assert_eq!(depth.len(), n, "depth buffer does not match {}x{}", width, height);

        let keyframe = keyframe || self.frame_count == 0;

        quantize_image(depth, &mut self.quantized);
        let (min_value, max_value) = rescale_image(&mut self.quantized);
        filter_image(&self.quantized, &mut self.high, &mut self.low);

        // Kick off the video coder, entropy-code the high bits while it
        // runs, then collect the coder output.
        self.low_out.clear();
        let mut video_started = false;
        match self.ensure_video_codec(params.video_type) {
            Ok(()) => {
                if let Some(codec) = self.codec.as_mut() {
                    match codec.encode_begin(params, keyframe, &self.low) {
                        Ok(()) => video_started = true,
                        Err(e) => tracing::warn!("video encode failed to start: {}", e),
                    }
                }
            }
            Err(e) => tracing::warn!("no video backend for {}: {}", params.video_type.name(), e),
        }

        self.high_out = entropy::compress(&self.high);
        if self.high_out.is_empty() {
            tracing::warn!("entropy coder produced no output; frame will not decode");
        }

        if video_started {
            if let Some(codec) = self.codec.as_mut() {
                if let Err(e) = codec.encode_finish(&mut self.low_out) {
                    tracing::warn!("video encode failed to finish: {}", e);
                    self.low_out.clear();
                }
            }
        }

        let mut frame_flags = 0u8;
        if keyframe {
            frame_flags |= flags::KEYFRAME;
        }
        if params.video_type.is_hevc() {
            frame_flags |= flags::HEVC;
        }
        let header = DepthHeader {
            flags: frame_flags,
            frame_number: self.frame_count as u16,
            width: width as u16,
            height: height as u16,
            minimum_depth: min_value,
            maximum_depth: max_value,
            high_uncompressed_bytes: self.high.len() as u32,
            high_compressed_bytes: self.high_out.len() as u32,
            low_compressed_bytes: self.low_out.len() as u32,
        };

        let mut frame =
            Vec::with_capacity(DEPTH_HEADER_BYTES + self.high_out.len() + self.low_out.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&self.high_out);
        frame.extend_from_slice(&self.low_out);

        self.frame_count += 1;
        tracing::debug!(
            frame = header.frame_number,
            keyframe,
            bytes = frame.len(),
            "compressed depth frame"
        );
        frame
    }

    /// Decompress one framed byte buffer into `depth_out`.
    ///
    /// Returns the image dimensions on success. On error nothing is
    /// published: `depth_out` holds no meaningful data, the frame counter
    /// is unchanged, and feeding a later keyframe recovers the session.
    pub fn decompress(&mut self, compressed: &[u8], depth_out: &mut Vec<u16>) -> Result<(u16, u16)> {
        let header = DepthHeader::parse(compressed)?;

        // Decoding can only start at a keyframe: P-frames reference coder
        // state established by the keyframe's parameter sets.
        if !header.is_keyframe() && self.frame_count == 0 {
            return Err(Error::MissingFrame);
        }

        let width = usize::from(header.width);
        let height = usize::from(header.height);
        let n = width * height;
        if n % 2 != 0 {
            return Err(Error::corrupted(format!(
                "odd pixel count for {}x{}",
                width, height
            )));
        }
        if header.high_uncompressed_bytes as usize != n / 2 {
            return Err(Error::corrupted(format!(
                "high stream is {} bytes, {}x{} needs {}",
                header.high_uncompressed_bytes,
                width,
                height,
                n / 2
            )));
        }

        let high_end = DEPTH_HEADER_BYTES + header.high_compressed_bytes as usize;
        let high_payload = &compressed[DEPTH_HEADER_BYTES..high_end];
        let low_payload = &compressed[high_end..high_end + header.low_compressed_bytes as usize];

        self.high = entropy::decompress(high_payload, n / 2)?;

        let video_type = header.video_type();
        self.ensure_video_codec(video_type)
            .map_err(|e| Error::corrupted(format!("no video backend: {}", e)))?;
        let codec = self
            .codec
            .as_mut()
            .ok_or_else(|| Error::corrupted("no video backend"))?;
        codec
            .decode(
                u32::from(header.width),
                u32::from(header.height),
                video_type,
                low_payload,
                &mut self.low,
            )
            .map_err(|e| Error::corrupted(format!("video decode failed: {}", e)))?;
        if self.low.len() < n {
            return Err(Error::corrupted(format!(
                "video decoded {} bytes, {}x{} needs {}",
                self.low.len(),
                width,
                height,
                n
            )));
        }

        unfilter_image(width, height, &self.high, &self.low, depth_out);
        unrescale_image(header.minimum_depth, header.maximum_depth, depth_out);
        dequantize_image(depth_out);

        self.frame_count += 1;
        tracing::debug!(
            frame = header.frame_number,
            keyframe = header.is_keyframe(),
            "decompressed depth frame"
        );
        Ok((header.width, header.height))
    }

    /// Make sure a backend matching `video_type` exists, unless one was
    /// injected. A failed factory call clears the context so a stale
    /// backend of the wrong type can never encode a frame.
    fn ensure_video_codec(&mut self, video_type: VideoType) -> Result<()> {
        if self.codec_pinned {
            return Ok(());
        }
        if self.codec.is_some() && self.codec_type == Some(video_type) {
            return Ok(());
        }
        self.codec = None;
        self.codec_type = None;
        let codec = create_video_codec(video_type)?;
        self.codec = Some(codec);
        self.codec_type = Some(video_type);
        Ok(())
    }
}

impl Default for DepthCompressor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::quantize::dequantize_depth;
    use crate::format::header::is_key_frame;
    use crate::video::RawVideoCodec;

    fn raw_session() -> DepthCompressor {
        DepthCompressor::with_video_codec(Box::new(RawVideoCodec::new()))
    }

    fn params(width: u32, height: u32) -> VideoParameters {
        VideoParameters {
            width,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_frame_is_promoted_to_keyframe() {
        let mut encoder = raw_session();
        let depth = vec![1000u16; 16];
        let frame = encoder.compress(&params(4, 4), &depth, false);
        assert!(is_key_frame(&frame));
        assert_eq!(encoder.frame_count(), 1);

        let frame2 = encoder.compress(&params(4, 4), &depth, false);
        assert!(!is_key_frame(&frame2));
    }

    #[test]
    fn test_frame_numbers_count_up() {
        let mut encoder = raw_session();
        let depth = vec![500u16; 16];
        for expected in 0..3u16 {
            let frame = encoder.compress(&params(4, 4), &depth, false);
            let header = DepthHeader::parse(&frame).unwrap();
            assert_eq!(header.frame_number, expected);
        }
    }

    #[test]
    fn test_missing_frame_on_fresh_session() {
        let mut encoder = raw_session();
        let depth = vec![1000u16; 16];
        let keyframe = encoder.compress(&params(4, 4), &depth, true);
        let pframe = encoder.compress(&params(4, 4), &depth, false);

        let mut decoder = raw_session();
        let mut out = Vec::new();
        assert!(matches!(
            decoder.decompress(&pframe, &mut out),
            Err(Error::MissingFrame)
        ));
        // The failed decode must not advance the session
        assert_eq!(decoder.frame_count(), 0);

        decoder.decompress(&keyframe, &mut out).unwrap();
        decoder.decompress(&pframe, &mut out).unwrap();
        assert_eq!(decoder.frame_count(), 2);
    }

    #[test]
    fn test_single_pixel_roundtrip() {
        let mut depth = vec![0u16; 16];
        depth[5] = 500;

        let mut encoder = raw_session();
        let frame = encoder.compress(&params(4, 4), &depth, true);

        let mut decoder = raw_session();
        let mut out = Vec::new();
        let (w, h) = decoder.decompress(&frame, &mut out).unwrap();
        assert_eq!((w, h), (4, 4));
        assert!(out[5] >= 499 && out[5] <= 501, "pixel was {}", out[5]);
        for (i, &d) in out.iter().enumerate() {
            if i != 5 {
                assert_eq!(d, 0);
            }
        }
    }

    #[test]
    fn test_constant_image_takes_range_one_path() {
        let depth = vec![1000u16; 64];
        let mut encoder = raw_session();
        let frame = encoder.compress(&params(8, 8), &depth, true);

        let header = DepthHeader::parse(&frame).unwrap();
        assert_eq!(header.minimum_depth, 675);
        assert_eq!(header.maximum_depth, 675);

        let mut decoder = raw_session();
        let mut out = Vec::new();
        decoder.decompress(&frame, &mut out).unwrap();
        let expected = dequantize_depth(675);
        assert_eq!(expected, 1000);
        assert!(out.iter().all(|&d| d == expected));
    }

    #[test]
    fn test_decode_rejects_wrong_pixel_budget() {
        let mut encoder = raw_session();
        let depth = vec![700u16; 16];
        let frame = encoder.compress(&params(4, 4), &depth, true);

        // Corrupt the width so the high stream no longer matches
        let mut bad = frame.clone();
        bad[4] = 8;
        let mut out = Vec::new();
        let mut decoder = raw_session();
        assert!(matches!(
            decoder.decompress(&bad, &mut out),
            Err(Error::Corrupted(_))
        ));
    }

    #[test]
    #[should_panic(expected = "depth buffer does not match")]
    fn test_wrong_depth_length_panics() {
        let mut encoder = raw_session();
        let depth = vec![0u16; 10];
        encoder.compress(&params(4, 4), &depth, true);
    }
}

//! Video coder adapters for the low-byte plane
//!
//! The codec core treats the video coder as a black box behind the
//! [`VideoCodec`] trait: a split begin/finish encode so entropy coding of
//! the high bits can overlap an asynchronous encoder, and a blocking
//! decode. Backends own their coder context for the life of a session;
//! after a successful keyframe the context must accept subsequent
//! non-keyframes.
//!
//! Hardware coder instances are scarce (NVENC caps out at two concurrent
//! encoders). Callers needing more streams should tile depth images into
//! one larger image rather than opening more sessions.

#[cfg(feature = "h264")]
pub mod h264;
pub mod raw;

#[cfg(feature = "h264")]
pub use h264::H264VideoCodec;
pub use raw::RawVideoCodec;

use crate::error::{Error, Result};

/// Video codec type carried in the frame header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoType {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
}

impl VideoType {
    /// Whether this type sets the HEVC header flag
    pub fn is_hevc(&self) -> bool {
        matches!(self, VideoType::H265)
    }

    /// Short codec name
    pub fn name(&self) -> &'static str {
        match self {
            VideoType::H264 => "h264",
            VideoType::H265 => "h265",
        }
    }
}

/// Per-session video coder configuration
///
/// Width and height describe the low-byte plane, which matches the depth
/// image. Anything beyond the type only tunes the coder; it does not affect
/// the frame format.
#[derive(Debug, Clone)]
pub struct VideoParameters {
    /// Image width in pixels, 1..=4096
    pub width: u32,
    /// Image height in pixels, 1..=4096
    pub height: u32,
    /// Codec for the low-byte plane
    pub video_type: VideoType,
    /// Target bits per second. Depth quality drops off a cliff below
    /// 2 Mbps at 320x288, so that is the default floor.
    pub bitrate: u32,
    /// Maximum frame rate hint for the rate controller
    pub max_frame_rate: f32,
    /// Coder-side keyframe interval, 0 for automatic. The session forces
    /// its own keyframes regardless.
    pub keyframe_interval: u32,
}

impl Default for VideoParameters {
    fn default() -> Self {
        VideoParameters {
            width: 320,
            height: 288,
            video_type: VideoType::H264,
            bitrate: 2_000_000,
            max_frame_rate: 30.0,
            keyframe_interval: 0,
        }
    }
}

/// Capability interface over the low-bits video coder
pub trait VideoCodec {
    /// Start encoding one low-byte plane. Non-blocking: implementations
    /// may run the coder asynchronously and let the caller entropy-code
    /// the high bits in the meantime.
    ///
    /// `plane` holds width*height luma bytes followed by width*height/2
    /// bytes of chroma scratch the coder may read or overwrite.
    fn encode_begin(&mut self, params: &VideoParameters, keyframe: bool, plane: &[u8])
        -> Result<()>;

    /// Block until the encode started by the matching [`encode_begin`]
    /// completes and append the coded bytes to `out`.
    ///
    /// [`encode_begin`]: VideoCodec::encode_begin
    fn encode_finish(&mut self, out: &mut Vec<u8>) -> Result<()>;

    /// Decode one coded low plane into `plane_out` (luma first, then the
    /// chroma area). Fails on a malformed bitstream or a dimension
    /// mismatch.
    fn decode(
        &mut self,
        width: u32,
        height: u32,
        video_type: VideoType,
        data: &[u8],
        plane_out: &mut Vec<u8>,
    ) -> Result<()>;
}

/// Create the bundled video coder backend for the given type.
pub fn create_video_codec(video_type: VideoType) -> Result<Box<dyn VideoCodec>> {
    match video_type {
        #[cfg(feature = "h264")]
        VideoType::H264 => Ok(Box::new(H264VideoCodec::new())),
        #[cfg(not(feature = "h264"))]
        VideoType::H264 => Err(Error::unsupported(
            "H.264 backend requires the 'h264' feature",
        )),
        VideoType::H265 => Err(Error::unsupported(
            "no bundled H.265 backend; inject one via DepthCompressor::with_video_codec",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_type() {
        assert!(!VideoType::H264.is_hevc());
        assert!(VideoType::H265.is_hevc());
        assert_eq!(VideoType::H264.name(), "h264");
        assert_eq!(VideoType::H265.name(), "h265");
    }

    #[test]
    fn test_default_parameters() {
        let params = VideoParameters::default();
        assert_eq!(params.video_type, VideoType::H264);
        assert!(params.bitrate >= 2_000_000);
        assert_eq!((params.width * params.height) % 2, 0);
    }

    #[test]
    fn test_factory_rejects_h265() {
        assert!(matches!(
            create_video_codec(VideoType::H265),
            Err(Error::Unsupported(_))
        ));
    }
}

//! Uncompressed passthrough backend
//!
//! Stores the low plane verbatim. Useful for lossless-low-bits capture and
//! for exercising the depth pipeline bit-exactly in tests, where a lossy
//! coder would mask filter or rescale bugs.

use super::{VideoCodec, VideoParameters, VideoType};
use crate::error::{Error, Result};

/// Bit-exact video backend that copies the plane through unchanged
#[derive(Debug, Default)]
pub struct RawVideoCodec {
    pending: Option<Vec<u8>>,
}

impl RawVideoCodec {
    pub fn new() -> Self {
        RawVideoCodec { pending: None }
    }

    fn plane_bytes(width: u32, height: u32) -> usize {
        let n = width as usize * height as usize;
        n + n / 2
    }
}

impl VideoCodec for RawVideoCodec {
    fn encode_begin(
        &mut self,
        params: &VideoParameters,
        _keyframe: bool,
        plane: &[u8],
    ) -> Result<()> {
        let expected = Self::plane_bytes(params.width, params.height);
        if plane.len() != expected {
            return Err(Error::invalid_input(format!(
                "plane is {} bytes, expected {} for {}x{}",
                plane.len(),
                expected,
                params.width,
                params.height
            )));
        }
        self.pending = Some(plane.to_vec());
        Ok(())
    }

    fn encode_finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::invalid_state("encode_finish without a matching encode_begin"))?;
        out.extend_from_slice(&pending);
        Ok(())
    }

    fn decode(
        &mut self,
        width: u32,
        height: u32,
        _video_type: VideoType,
        data: &[u8],
        plane_out: &mut Vec<u8>,
    ) -> Result<()> {
        let expected = Self::plane_bytes(width, height);
        if data.len() != expected {
            return Err(Error::codec(format!(
                "raw plane is {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        plane_out.clear();
        plane_out.extend_from_slice(data);
        Ok(())
    }
}

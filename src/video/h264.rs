//! H.264 backend using OpenH264
//!
//! Feeds the low-byte plane to Cisco's OpenH264 as a YUV420 buffer: the
//! width*height luma carries the depth low bits and the trailing
//! width*height/2 chroma area is the zero-filled scratch appended by the
//! filter. Output is annex-B NAL units; keyframes carry SPS/PPS so a
//! decoder can join at any keyframe.
//!
//! OpenH264 encodes synchronously, so `encode_begin` runs the coder to
//! completion and buffers the bitstream for `encode_finish`. The overlap
//! with the entropy coder is lost on this backend; correctness is
//! unaffected.

use openh264::decoder::Decoder as OpenH264Decoder;
use openh264::encoder::{
    BitRate, Encoder as OpenH264Encoder, EncoderConfig, FrameRate, IntraFramePeriod,
    RateControlMode,
};
use openh264::formats::{YUVBuffer, YUVSource};
use openh264::OpenH264API;

use super::{VideoCodec, VideoParameters, VideoType};
use crate::error::{Error, Result};

/// H.264 low-bits backend wrapping OpenH264
#[derive(Default)]
pub struct H264VideoCodec {
    encoder: Option<OpenH264Encoder>,
    encoder_size: (u32, u32),
    decoder: Option<OpenH264Decoder>,
    pending: Option<Vec<u8>>,
}

impl H264VideoCodec {
    pub fn new() -> Self {
        H264VideoCodec {
            encoder: None,
            encoder_size: (0, 0),
            decoder: None,
            pending: None,
        }
    }

    /// Build or rebuild the encoder for the requested parameters.
    fn ensure_encoder(&mut self, params: &VideoParameters) -> Result<&mut OpenH264Encoder> {
        let size = (params.width, params.height);
        if self.encoder.is_some() && self.encoder_size != size {
            // Dimension change invalidates the coder context
            self.encoder = None;
        }
        if self.encoder.is_none() {
            let mut config = EncoderConfig::new()
                .bitrate(BitRate::from_bps(params.bitrate))
                .max_frame_rate(FrameRate::from_hz(params.max_frame_rate))
                .rate_control_mode(RateControlMode::Bitrate)
                .scene_change_detect(false);
            config = if params.keyframe_interval > 0 {
                config.intra_frame_period(IntraFramePeriod::from_num_frames(
                    params.keyframe_interval,
                ))
            } else {
                config.intra_frame_period(IntraFramePeriod::auto())
            };

            let api = OpenH264API::from_source();
            let encoder = OpenH264Encoder::with_api_config(api, config)
                .map_err(|e| Error::codec(format!("failed to create H.264 encoder: {:?}", e)))?;
            self.encoder = Some(encoder);
            self.encoder_size = size;
        }
        self.encoder
            .as_mut()
            .ok_or_else(|| Error::invalid_state("H.264 encoder unavailable"))
    }

    fn ensure_decoder(&mut self) -> Result<&mut OpenH264Decoder> {
        if self.decoder.is_none() {
            let decoder = OpenH264Decoder::new()
                .map_err(|e| Error::codec(format!("failed to create H.264 decoder: {:?}", e)))?;
            self.decoder = Some(decoder);
        }
        self.decoder
            .as_mut()
            .ok_or_else(|| Error::invalid_state("H.264 decoder unavailable"))
    }
}

impl VideoCodec for H264VideoCodec {
    fn encode_begin(
        &mut self,
        params: &VideoParameters,
        keyframe: bool,
        plane: &[u8],
    ) -> Result<()> {
        if params.video_type != VideoType::H264 {
            return Err(Error::unsupported(format!(
                "H.264 backend cannot encode {}",
                params.video_type.name()
            )));
        }
        let width = params.width as usize;
        let height = params.height as usize;
        let n = width * height;
        if plane.len() != n + n / 2 {
            return Err(Error::invalid_input(format!(
                "plane is {} bytes, expected {} for {}x{}",
                plane.len(),
                n + n / 2,
                width,
                height
            )));
        }

        let encoder = self.ensure_encoder(params)?;
        if keyframe {
            encoder.force_intra_frame();
        }

        let yuv = YUVBuffer::from_vec(plane.to_vec(), width, height);
        let bitstream = encoder
            .encode(&yuv)
            .map_err(|e| Error::codec(format!("H.264 encoding failed: {:?}", e)))?;
        self.pending = Some(bitstream.to_vec());
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
        video_type: VideoType,
        data: &[u8],
        plane_out: &mut Vec<u8>,
    ) -> Result<()> {
        if video_type != VideoType::H264 {
            return Err(Error::unsupported(format!(
                "H.264 backend cannot decode {}",
                video_type.name()
            )));
        }
        if data.is_empty() {
            return Err(Error::codec("empty H.264 payload"));
        }

        let decoder = self.ensure_decoder()?;
        let yuv = match decoder.decode(data) {
            Ok(Some(yuv)) => yuv,
            Ok(None) => {
                return Err(Error::codec(
                    "H.264 decoder produced no frame for this payload",
                ))
            }
            Err(e) => return Err(Error::codec(format!("H.264 decoding failed: {:?}", e))),
        };

        let (dec_width, dec_height) = yuv.dimensions();
        if dec_width != width as usize || dec_height != height as usize {
            return Err(Error::codec(format!(
                "decoded {}x{}, frame header says {}x{}",
                dec_width, dec_height, width, height
            )));
        }

        // Copy the luma rows (stride-stripped); the chroma area is scratch
        // and stays zeroed.
        let n = dec_width * dec_height;
        let (y_stride, _, _) = yuv.strides();
        let y_data = yuv.y();
        plane_out.clear();
        plane_out.reserve(n + n / 2);
        for row in 0..dec_height {
            let start = row * y_stride;
            plane_out.extend_from_slice(&y_data[start..start + dec_width]);
        }
        plane_out.resize(n + n / 2, 0);
        Ok(())
    }
}

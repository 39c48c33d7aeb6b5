//! Depth codec implementation
//!
//! The pipeline, in encode order:
//!
//! ```text
//! raw depth -> quantize -> rescale -> filter -+-> high bits -> Zstd ----+
//!                                             |                        +-> frame
//!                                             +-> low bits  -> video --+
//! ```
//!
//! Decoding runs the same stages in reverse. Quantization matches the
//! sensor's accuracy bands, rescaling stretches the scene over the full
//! code range for the lossy coder, and the filter splits each 11-bit code
//! into a losslessly-coded high nibble and a video-coded low byte.

pub mod filter;
pub mod quantize;
pub mod rescale;
pub mod session;

pub use filter::{filter_image, unfilter_image};
pub use quantize::{
    dequantize_depth, dequantize_image, quantize_depth, quantize_image, quantize_step,
    QUANT_CODE_LIMIT,
};
pub use rescale::{rescale_image, unrescale_image};
pub use session::DepthCompressor;

//! ZDV - A lossy depth stream codec written in Rust
//!
//! ZDV compresses streams of 16-bit depth images, as produced by
//! time-of-flight sensors like the Azure Kinect DK, into a compact framed
//! byte format for real-time streaming. Depth is quantized to match sensor
//! accuracy, split into a high-significance channel (losslessly coded with
//! Zstd) and a low-significance channel (coded with H.264 or HEVC), and
//! framed with a 26-byte header.
//!
//! # Architecture
//!
//! - `codec`: the depth-domain transforms (quantize, rescale, filter) and
//!   the [`DepthCompressor`] session type
//! - `format`: the on-wire frame header and frame predicates
//! - `entropy`: Zstd adapter for the high-bit stream
//! - `video`: video coder adapters for the low-byte plane
//!
//! # Usage
//!
//! ```rust,ignore
//! use zdv::{DepthCompressor, VideoParameters};
//!
//! let params = VideoParameters { width: 320, height: 288, ..Default::default() };
//! let mut encoder = DepthCompressor::new();
//! let frame = encoder.compress(&params, &depth, true);
//!
//! let mut decoder = DepthCompressor::new();
//! let mut depth_out = Vec::new();
//! let (width, height) = decoder.decompress(&frame, &mut depth_out)?;
//! ```
//!
//! Sessions must see frames in order and always start with a keyframe;
//! see [`codec::session`] for the sequencing rules.

pub mod codec;
pub mod entropy;
pub mod error;
pub mod format;
pub mod video;

pub use codec::DepthCompressor;
pub use error::{Error, Result};
pub use format::{is_depth_frame, is_key_frame};
pub use video::{VideoParameters, VideoType};

/// ZDV version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the ZDV library
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
        }
    }
}

/// Initialize the ZDV library with the given configuration
pub fn init(config: Config) -> Result<()> {
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .try_init()
            .map_err(|e| Error::init(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}

//! Depth quantization matched to time-of-flight sensor accuracy
//!
//! The Azure Kinect DK reports depth with an uncertainty below 0.2% of
//! range, which works out to roughly:
//!
//! ```text
//! < 750 mm   : 1.5 mm precision (or better)
//! < 1500 mm  : 3 mm precision
//! < 3000 mm  : 6 mm precision
//! < 6000 mm  : 12 mm precision
//! < 12000 mm : 24 mm precision
//! ```
//!
//! Quantizing to match the sensor keeps only the bits that carry signal,
//! which shrinks the 16-bit input to an 11-bit code:
//!
//! ```text
//! [0, 200] mm      -> 0            (no depth data)
//! (200, 750) mm    -> [1, 550)     (lossless)
//! [750, 1500) mm   -> [550, 925)   (quantized 2x)
//! [1500, 3000) mm  -> [925, 1300)  (quantized 4x)
//! [3000, 6000) mm  -> [1300, 1675) (quantized 8x)
//! [6000, 11840) mm -> [1675, 2040) (quantized 16x)
//! Larger depth     -> 0            (no depth data)
//! ```
//!
//! Code 0 is the sentinel for "no reading" and survives every later stage
//! of the pipeline bit-exactly. All arithmetic is truncating integer math;
//! the inverse uses the lower endpoint of each band.

/// Largest valid quantized code plus one. Codes at or above this value
/// dequantize to 0 (no data).
pub const QUANT_CODE_LIMIT: u16 = 2040;

/// Quantize a single depth value in millimeters to an 11-bit code.
///
/// Depths at or below the 200 mm minimum operating range, and at or above
/// 11840 mm, map to the sentinel 0.
#[inline]
pub fn quantize_depth(depth: u16) -> u16 {
    if depth <= 200 {
        return 0;
    }
    if depth < 750 {
        return depth - 200;
    }
    if depth < 1500 {
        return 550 + (depth - 750) / 2;
    }
    if depth < 3000 {
        return 925 + (depth - 1500) / 4;
    }
    if depth < 6000 {
        return 1300 + (depth - 3000) / 8;
    }
    if depth < 11840 {
        return 1675 + (depth - 6000) / 16;
    }
    0
}

/// Dequantize an 11-bit code back to depth in millimeters.
///
/// The exact integer inverse of [`quantize_depth`] using the lower endpoint
/// of each band. Codes outside [1, 2040) are invalid and return 0.
#[inline]
pub fn dequantize_depth(quantized: u16) -> u16 {
    if quantized == 0 {
        return 0;
    }
    if quantized < 550 {
        return quantized + 200;
    }
    if quantized < 925 {
        return 750 + (quantized - 550) * 2;
    }
    if quantized < 1300 {
        return 1500 + (quantized - 925) * 4;
    }
    if quantized < 1675 {
        return 3000 + (quantized - 1300) * 8;
    }
    if quantized < QUANT_CODE_LIMIT {
        return 6000 + (quantized - 1675) * 16;
    }
    0
}

/// Quantize a whole depth image into a reusable output buffer.
pub fn quantize_image(depth: &[u16], quantized: &mut Vec<u16>) {
    quantized.clear();
    quantized.extend(depth.iter().map(|&d| quantize_depth(d)));
}

/// Dequantize a whole image of codes in place.
pub fn dequantize_image(codes: &mut [u16]) {
    for code in codes.iter_mut() {
        *code = dequantize_depth(*code);
    }
}

/// Quantization step size in millimeters for a given depth.
///
/// This is the worst-case round-trip error of quantize followed by
/// dequantize for a depth inside the valid range.
pub fn quantize_step(depth: u16) -> u16 {
    if depth < 750 {
        1
    } else if depth < 1500 {
        2
    } else if depth < 3000 {
        4
    } else if depth < 6000 {
        8
    } else {
        16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_and_limits() {
        assert_eq!(quantize_depth(0), 0);
        assert_eq!(quantize_depth(200), 0);
        assert_eq!(quantize_depth(201), 1);
        assert_eq!(quantize_depth(11839), 2039);
        assert_eq!(quantize_depth(11840), 0);
        assert_eq!(quantize_depth(u16::MAX), 0);

        assert_eq!(dequantize_depth(0), 0);
        assert_eq!(dequantize_depth(QUANT_CODE_LIMIT), 0);
        assert_eq!(dequantize_depth(u16::MAX), 0);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(quantize_depth(749), 549);
        assert_eq!(quantize_depth(750), 550);
        assert_eq!(quantize_depth(1499), 924);
        assert_eq!(quantize_depth(1500), 925);
        assert_eq!(quantize_depth(2999), 1299);
        assert_eq!(quantize_depth(3000), 1300);
        assert_eq!(quantize_depth(5999), 1674);
        assert_eq!(quantize_depth(6000), 1675);
    }

    #[test]
    fn test_monotonic_over_valid_range() {
        let mut prev = quantize_depth(201);
        for d in 202..=11839u16 {
            let q = quantize_depth(d);
            assert!(q >= prev, "quantizer not monotonic at {} mm", d);
            prev = q;
        }
    }

    #[test]
    fn test_band_coverage() {
        // Every code in [1, 2040) is hit by some depth, and dequantizing
        // that code quantizes back to itself.
        for q in 1..QUANT_CODE_LIMIT {
            let d = dequantize_depth(q);
            assert!(d > 200 && d < 11840);
            assert_eq!(quantize_depth(d), q, "code {} unreachable", q);
        }
    }

    #[test]
    fn test_bounded_roundtrip_error() {
        for d in 201..11840u16 {
            let back = dequantize_depth(quantize_depth(d));
            let err = if back > d { back - d } else { d - back };
            assert!(
                err < quantize_step(d),
                "round-trip error {} at {} mm exceeds band step",
                err,
                d
            );
        }
    }

    #[test]
    fn test_image_helpers() {
        let depth = vec![0u16, 500, 1000, 4000, 12000];
        let mut codes = Vec::new();
        quantize_image(&depth, &mut codes);
        assert_eq!(codes, vec![0, 300, 675, 1425, 0]);

        dequantize_image(&mut codes);
        assert_eq!(codes, vec![0, 500, 1000, 4000, 0]);
    }
}

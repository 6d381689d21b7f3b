//! 64-bit perceptual fingerprints of raster images.
//!
//! The hash is the classic pHash construction: DCT preprocessing over a
//! downscaled grayscale image, then an 8×8 mean hash over the low-frequency
//! block. Frequency-domain hashing tolerates compiler, font, and
//! antialiasing noise while still catching real visual regressions; a
//! cryptographic or pixel hash would flip on every toolchain upgrade.

use crate::{Error, Result};
use image_hasher::{HashAlg, HasherConfig};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A 64-bit perceptual hash, written as 16 lowercase hex characters.
///
/// Comparison is exact equality; [`hamming_distance`](Self::hamming_distance)
/// exists for diagnostics only and never decides pass/fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Hex characters in the wire form.
    pub const HEX_LEN: usize = 16;
    /// Bits in the hash; also the largest possible Hamming distance.
    pub const BITS: u32 = 64;

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Compute the fingerprint of a raster image on disk.
    pub fn of_image(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|source| Error::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let fingerprint = Self::of_decoded(&image);
        tracing::debug!(path = %path.display(), %fingerprint, "computed fingerprint");
        Ok(fingerprint)
    }

    /// Compute the fingerprint of an already-decoded image.
    ///
    /// Pure function of image content: equal pixels give equal fingerprints.
    pub fn of_decoded(image: &image::DynamicImage) -> Self {
        let hasher = HasherConfig::new()
            .hash_size(8, 8)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();
        let hash = hasher.hash_image(image);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(hash.as_bytes());
        Self(u64::from_be_bytes(bytes))
    }

    /// Number of differing bit positions. Symmetric, zero iff equal.
    pub const fn hamming_distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.to_be_bytes()))
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidFingerprint {
            text: s.to_string(),
            expected: Self::HEX_LEN,
        };
        if s.len() != Self::HEX_LEN {
            return Err(invalid());
        }
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(u64::from_be_bytes(bytes)))
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let fp: Fingerprint = "af3c91e0b4d2f718".parse().expect("parse");
        assert_eq!(fp.to_string(), "af3c91e0b4d2f718");
        assert_eq!(fp.bits(), 0xaf3c_91e0_b4d2_f718);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("af3c".parse::<Fingerprint>().is_err());
        assert!("zzzz91e0b4d2f718".parse::<Fingerprint>().is_err());
        assert!("af3c91e0b4d2f7188".parse::<Fingerprint>().is_err());
        assert!("".parse::<Fingerprint>().is_err());
    }

    #[test]
    fn hamming_distance_is_symmetric_and_zero_on_identity() {
        let a = Fingerprint::from_bits(0x00ff_00ff_00ff_00ff);
        let b = Fingerprint::from_bits(0x00ff_00ff_00ff_00fe);
        assert_eq!(a.hamming_distance(a), 0);
        assert_eq!(a.hamming_distance(b), 1);
        assert_eq!(b.hamming_distance(a), 1);
        assert_eq!(
            Fingerprint::from_bits(0).hamming_distance(Fingerprint::from_bits(u64::MAX)),
            Fingerprint::BITS
        );
    }

    #[test]
    fn equal_pixels_fingerprint_identically() {
        let image = image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(64, 64, |x, y| {
            image::Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255])
        }));
        let a = Fingerprint::of_decoded(&image);
        let b = Fingerprint::of_decoded(&image.clone());
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_structures_fingerprint_differently() {
        let flat = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            64,
            64,
            image::Rgba([255, 255, 255, 255]),
        ));
        let checker = image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(64, 64, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        }));
        let a = Fingerprint::of_decoded(&flat);
        let b = Fingerprint::of_decoded(&checker);
        assert!(a.hamming_distance(b) > 0);
    }
}

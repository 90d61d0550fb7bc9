// src/source.rs
//
// Decoder-facing data model: the metadata a source must expose before any
// pixel is decoded, the packed-RGBA raster the decode fills, and the
// RasterSource seam implemented by the TIFF reader (and by test doubles).

use crate::error::{AvifTiffError, Result};
use crate::{MAX_DIMENSION, MAX_PIXELS};
use std::borrow::Cow;

/// How color channels are laid out in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarConfig {
    /// Channels interleaved per pixel (TIFF PlanarConfiguration = 1, the
    /// baseline default).
    Chunky,
    /// Channels stored in separate planes (PlanarConfiguration = 2).
    Planar,
}

/// Metadata required before a raster can be allocated and decoded.
/// Read-only once populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u32,
    pub samples_per_pixel: u32,
    pub planar_config: PlanarConfig,
}

/// Validate dimensions against the crate limits and return the pixel count.
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<u64> {
    if width == 0 || height == 0 {
        return Err(AvifTiffError::unsupported_format(format!(
            "zero-sized image ({width}x{height})"
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(AvifTiffError::dimension_exceeds_limit(
            width.max(height),
            MAX_DIMENSION,
        ));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_PIXELS {
        return Err(AvifTiffError::pixel_count_exceeds_limit(pixels, MAX_PIXELS));
    }
    Ok(pixels)
}

/// Fully decoded pixel buffer: one packed 32-bit RGBA sample per pixel,
/// row-major, rows ordered bottom-to-top (raster row 0 is the lowest image
/// row, matching the RGBA-raster convention of TIFF readers). Length is
/// exactly `width * height` samples.
#[derive(Debug)]
pub struct Raster {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Raster {
    /// Sample depth of the packed RGBA decode path. Sources with deeper
    /// channels are rejected before a raster is filled.
    pub const SAMPLE_DEPTH: u32 = 8;

    /// One packed RGBA sample per pixel.
    pub const BYTES_PER_SAMPLE: usize = 4;

    /// Allocate a zeroed raster for `width * height` samples. Allocation is
    /// fallible: limit violations and out-of-memory report errors instead of
    /// aborting, so a failed acquisition decodes nothing.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixels64 = check_dimensions(width, height)?;
        let bytes = (pixels64 as usize)
            .checked_mul(Self::BYTES_PER_SAMPLE)
            .ok_or_else(|| AvifTiffError::pixel_count_exceeds_limit(pixels64, MAX_PIXELS))?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| AvifTiffError::allocation_failed("raster", bytes))?;
        pixels.resize(bytes, 0);
        #[cfg(test)]
        crate::track::raster_created();
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row size in bytes: `width * 4`.
    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * Self::BYTES_PER_SAMPLE
    }

    /// Raster row `r`, counted from the first decoded row (the bottom of
    /// the image).
    pub fn row(&self, r: u32) -> &[u8] {
        let stride = self.bytes_per_row();
        let start = r as usize * stride;
        &self.pixels[start..start + stride]
    }

    pub fn row_mut(&mut self, r: u32) -> &mut [u8] {
        let stride = self.bytes_per_row();
        let start = r as usize * stride;
        &mut self.pixels[start..start + stride]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
impl Drop for Raster {
    fn drop(&mut self) {
        crate::track::raster_dropped();
    }
}

/// The decoder handle seam. The production implementation wraps a TIFF
/// decoder; tests substitute doubles to inject metadata, decode, and
/// allocation failures.
pub trait RasterSource {
    /// Human-readable name for diagnostics (typically the input path).
    fn source_name(&self) -> Cow<'_, str>;

    /// Resolve the metadata required before any pixel is decoded. Missing
    /// required fields fail here, before anything is allocated.
    fn metadata(&mut self) -> Result<SourceMetadata>;

    /// Embedded ICC profile bytes, if the container carries one. Absence is
    /// not an error.
    fn icc_profile(&mut self) -> Result<Option<Vec<u8>>>;

    /// Decode the full image as packed 8-bit RGBA into `raster`.
    ///
    /// Rows are written bottom-to-top: raster row `r` holds image row
    /// `height - 1 - r`. A decode failure is fatal for the attempt; the
    /// caller must not convert a partially filled raster.
    fn decode_rgba(&mut self, raster: &mut Raster) -> Result<()>;
}

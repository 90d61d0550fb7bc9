// src/rgb.rs
//
// Interleaved RGBA staging buffer handed to the YUV converter: top-to-bottom
// row order, fixed stride, depth pinned to the raster sample depth rather
// than the destination image depth.

use crate::error::{AvifTiffError, Result};
use crate::source::{check_dimensions, Raster};

/// Row-major interleaved RGBA pixel buffer in top-to-bottom row order.
/// Row stride is exactly `width * 4` bytes.
#[derive(Debug)]
pub struct RgbPixels {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    depth: u32,
}

impl RgbPixels {
    /// Allocate a zeroed buffer for `width * height` packed RGBA samples at
    /// `depth` bits per channel. Only the 8-bit layout is representable
    /// today; the depth is recorded so the converter descriptor can carry it
    /// without consulting the destination image.
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        if depth != Raster::SAMPLE_DEPTH {
            return Err(AvifTiffError::unsupported_format(format!(
                "{depth}-bit RGB staging buffer"
            )));
        }
        let bytes = width as usize * height as usize * Raster::BYTES_PER_SAMPLE;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| AvifTiffError::allocation_failed("RGB buffer", bytes))?;
        pixels.resize(bytes, 0);
        #[cfg(test)]
        crate::track::rgb_created();
        Ok(Self {
            pixels,
            width,
            height,
            depth,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Row stride in bytes.
    pub fn row_bytes(&self) -> u32 {
        self.width * Raster::BYTES_PER_SAMPLE as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Destination row `y`, counted from the top of the image.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_bytes() as usize;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.row_bytes() as usize;
        let start = y as usize * stride;
        &mut self.pixels[start..start + stride]
    }

    /// Copy `raster` into this buffer while inverting vertical row order:
    /// raster row `r` (bottom-up) lands at destination row
    /// `height - 1 - r` (top-down). Each row copy is byte-exact,
    /// `width * 4` bytes.
    pub fn copy_flipped_from(&mut self, raster: &Raster) -> Result<()> {
        if raster.width() != self.width || raster.height() != self.height {
            return Err(AvifTiffError::internal_panic(format!(
                "raster {}x{} does not match RGB buffer {}x{}",
                raster.width(),
                raster.height(),
                self.width,
                self.height
            )));
        }
        for r in 0..self.height {
            let dst = self.height - 1 - r;
            self.row_mut(dst).copy_from_slice(raster.row(r));
        }
        Ok(())
    }
}

#[cfg(test)]
impl Drop for RgbPixels {
    fn drop(&mut self) {
        crate::track::rgb_dropped();
    }
}

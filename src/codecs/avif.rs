// src/codecs/avif.rs
//
// Safe abstractions for libavif FFI operations.
// This module provides an RAII-based wrapper that hides raw pointers and
// eliminates unsafe blocks from the calling code.
#![deny(unsafe_op_in_unsafe_fn)]

use crate::error::{AvifTiffError, Result};
use crate::reader::{YuvFormat, YuvOutput};
use crate::rgb::RgbPixels;
use libavif_sys::*;
use std::ptr::NonNull;

impl YuvFormat {
    pub(crate) fn to_avif(self) -> avifPixelFormat {
        match self {
            YuvFormat::Yuv444 => AVIF_PIXEL_FORMAT_YUV444,
            YuvFormat::Yuv422 => AVIF_PIXEL_FORMAT_YUV422,
            YuvFormat::Yuv420 => AVIF_PIXEL_FORMAT_YUV420,
            YuvFormat::Yuv400 => AVIF_PIXEL_FORMAT_YUV400,
        }
    }
}

fn subsampled(v: u32, shift: u32) -> u32 {
    (v + ((1 << shift) - 1)) >> shift
}

/// Safe wrapper for avifImage that manages its lifetime using RAII.
///
/// The image starts empty; the reader pipeline sets dimensions, chroma
/// format, depth, and ICC profile, then fills the YUV planes through
/// [`YuvOutput::convert_rgb`]. The wrapper frees the image exactly once,
/// on every exit path.
pub struct AvifImage {
    ptr: Option<NonNull<avifImage>>,
}

impl AvifImage {
    /// Create an empty image with no planes allocated.
    pub fn empty() -> Result<Self> {
        let ptr = unsafe { avifImageCreateEmpty() };
        let ptr = NonNull::new(ptr).ok_or_else(|| {
            AvifTiffError::allocation_failed("avifImage", std::mem::size_of::<avifImage>())
        })?;
        #[cfg(test)]
        crate::track::avif_image_created();
        Ok(Self { ptr: Some(ptr) })
    }

    fn raw(&self) -> *mut avifImage {
        self.ptr
            .expect("avifImage pointer was released while still in use")
            .as_ptr()
    }

    pub fn width(&self) -> u32 {
        unsafe { (*self.raw()).width }
    }

    pub fn height(&self) -> u32 {
        unsafe { (*self.raw()).height }
    }

    pub fn depth(&self) -> u32 {
        unsafe { (*self.raw()).depth }
    }

    /// Set CICP color properties and YUV range.
    pub fn set_color_properties(
        &mut self,
        primaries: u16,
        transfer: u16,
        matrix: u16,
        yuv_range: avifRange,
    ) {
        let raw = self.raw();
        unsafe {
            (*raw).colorPrimaries = primaries;
            (*raw).transferCharacteristics = transfer;
            (*raw).matrixCoefficients = matrix;
            (*raw).yuvRange = yuv_range;
        }
    }

    /// Attached ICC profile bytes; empty when no profile is set.
    pub fn icc_profile(&self) -> &[u8] {
        let raw = self.raw();
        unsafe {
            let icc = &(*raw).icc;
            if icc.data.is_null() || icc.size == 0 {
                &[]
            } else {
                std::slice::from_raw_parts(icc.data, icc.size)
            }
        }
    }

    /// Dimensions of plane 0 (luma) or 1/2 (chroma, subsampled per the
    /// configured format). None for chroma planes of 4:0:0.
    pub fn plane_dimensions(&self, plane: usize) -> Option<(u32, u32)> {
        let raw = self.raw();
        let (width, height, format) =
            unsafe { ((*raw).width, (*raw).height, (*raw).yuvFormat) };
        match plane {
            0 => Some((width, height)),
            1 | 2 => {
                let (shift_x, shift_y) = match format {
                    AVIF_PIXEL_FORMAT_YUV444 => (0, 0),
                    AVIF_PIXEL_FORMAT_YUV422 => (1, 0),
                    AVIF_PIXEL_FORMAT_YUV420 => (1, 1),
                    _ => return None,
                };
                Some((subsampled(width, shift_x), subsampled(height, shift_y)))
            }
            _ => None,
        }
    }

    /// Row `y` of a YUV plane as raw bytes (two bytes per sample above
    /// 8-bit depth). None when the plane is not allocated.
    pub fn plane_row(&self, plane: usize, y: u32) -> Option<&[u8]> {
        let (plane_width, plane_height) = self.plane_dimensions(plane)?;
        if y >= plane_height {
            return None;
        }
        let raw = self.raw();
        unsafe {
            let base = (*raw).yuvPlanes[plane];
            if base.is_null() {
                return None;
            }
            let row_bytes = (*raw).yuvRowBytes[plane] as usize;
            let sample_bytes = if (*raw).depth > 8 { 2 } else { 1 };
            let row = base.add(y as usize * row_bytes);
            Some(std::slice::from_raw_parts(
                row,
                plane_width as usize * sample_bytes,
            ))
        }
    }
}

impl YuvOutput for AvifImage {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        let raw = self.raw();
        unsafe {
            (*raw).width = width;
            (*raw).height = height;
        }
    }

    fn set_yuv_format(&mut self, format: YuvFormat) {
        let raw = self.raw();
        unsafe {
            (*raw).yuvFormat = format.to_avif();
        }
    }

    fn set_depth(&mut self, depth: u32) {
        let raw = self.raw();
        unsafe {
            (*raw).depth = depth;
        }
    }

    fn set_icc_profile(&mut self, icc: &[u8]) -> Result<()> {
        let result = unsafe { avifImageSetProfileICC(self.raw(), icc.as_ptr(), icc.len()) };
        if result != AVIF_RESULT_OK {
            return Err(AvifTiffError::avif_failed(
                "avifImageSetProfileICC",
                result as u32,
            ));
        }
        Ok(())
    }

    /// Convert RGB to YUV using libavif's optimized conversion. Builds an
    /// avifRGBImage descriptor that borrows the staging buffer: dimensions
    /// come from the image, the depth is forced to the buffer depth, and
    /// libavif rescales to the image's final depth internally.
    fn convert_rgb(&mut self, rgb: &RgbPixels) -> Result<()> {
        let raw = self.raw();
        if rgb.width() != self.width() || rgb.height() != self.height() {
            return Err(AvifTiffError::internal_panic(format!(
                "RGB buffer {}x{} does not match image {}x{}",
                rgb.width(),
                rgb.height(),
                self.width(),
                self.height()
            )));
        }
        let mut descriptor: avifRGBImage = unsafe { std::mem::zeroed() };
        unsafe {
            avifRGBImageSetDefaults(&mut descriptor, raw);
            descriptor.format = AVIF_RGB_FORMAT_RGBA;
            descriptor.depth = rgb.depth();
            descriptor.pixels = rgb.as_bytes().as_ptr() as *mut u8;
            descriptor.rowBytes = rgb.row_bytes();
        }
        let result = unsafe { avifImageRGBToYUV(raw, &descriptor) };
        if result != AVIF_RESULT_OK {
            return Err(AvifTiffError::avif_failed(
                "avifImageRGBToYUV",
                result as u32,
            ));
        }
        Ok(())
    }
}

impl Drop for AvifImage {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            unsafe { avifImageDestroy(ptr.as_ptr()) };
        }
        #[cfg(test)]
        crate::track::avif_image_dropped();
    }
}

// src/reader.rs
//
// The ingestion pipeline: metadata validation, raster acquisition, row
// reorientation, profile and depth resolution, and the hand-off to the
// RGB->YUV converter. Sources and outputs are traits so every failure leg
// can be exercised without touching the filesystem or FFI.

use crate::error::{AvifTiffError, Result};
use crate::rgb::RgbPixels;
use crate::source::{Raster, RasterSource};
use crate::tif::TiffSource;
use std::path::Path;
use tracing::{debug, warn};

/// Chroma subsampling layout of the destination image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YuvFormat {
    Yuv444,
    Yuv422,
    Yuv420,
    Yuv400,
}

/// The destination side of the pipeline. The production implementation is
/// the libavif-backed [`crate::AvifImage`]; tests substitute a recording
/// double to observe mutations and inject conversion failures.
///
/// The caller owns the output; the pipeline only mutates it.
pub trait YuvOutput {
    fn set_dimensions(&mut self, width: u32, height: u32);
    fn set_yuv_format(&mut self, format: YuvFormat);
    fn set_depth(&mut self, depth: u32);

    /// Attach an ICC profile; bytes are copied into the output.
    fn set_icc_profile(&mut self, icc: &[u8]) -> Result<()>;

    /// Convert the top-down RGB buffer into the output's YUV planes, in the
    /// output's configured chroma format and final depth. Depth rescaling
    /// from the buffer depth is the converter's job.
    fn convert_rgb(&mut self, rgb: &RgbPixels) -> Result<()>;
}

/// Resolve the destination bit depth.
///
/// | requested | source depth | final     |
/// |-----------|--------------|-----------|
/// | d != 0    | any          | d         |
/// | 0         | 8            | 8         |
/// | 0         | other        | 12        |
///
/// The RGBA decode path always yields 8-bit samples today, so the last row
/// is reachable only through a non-default source.
pub fn resolve_output_depth(requested_depth: u32, source_depth: u32) -> u32 {
    if requested_depth != 0 {
        requested_depth
    } else if source_depth == 8 {
        8
    } else {
        12
    }
}

/// Decode `source` and populate `output` with dimensions, chroma format,
/// final depth, optional ICC profile, and converted YUV planes.
///
/// On success returns the resolved source bit depth. On failure nothing is
/// retried and every acquired buffer has already been released; the output's
/// plane data is untouched.
pub fn read_from_source<S, O>(
    output: &mut O,
    source: &mut S,
    format: YuvFormat,
    requested_depth: u32,
) -> Result<u32>
where
    S: RasterSource + ?Sized,
    O: YuvOutput + ?Sized,
{
    // Raster acquisition: required metadata first, then a fallible
    // allocation, then the full-image decode. A decode failure is fatal;
    // a partial raster is never converted.
    let meta = source.metadata()?;
    let mut raster = Raster::new(meta.width, meta.height)?;
    if let Err(e) = source.decode_rgba(&mut raster) {
        warn!(source = %source.source_name(), error = %e, "TIFF decode failed");
        return Err(e);
    }
    debug!(
        source = %source.source_name(),
        width = meta.width,
        height = meta.height,
        bits_per_sample = meta.bits_per_sample,
        "decoded TIFF raster"
    );

    // Profile and depth resolution.
    if let Some(icc) = source.icc_profile()? {
        output.set_icc_profile(&icc)?;
    }
    let source_depth = Raster::SAMPLE_DEPTH;
    let final_depth = resolve_output_depth(requested_depth, source_depth);
    output.set_dimensions(meta.width, meta.height);
    output.set_yuv_format(format);
    output.set_depth(final_depth);

    // Conversion bridge: the staging buffer depth is the raster sample
    // depth, not the final depth; the converter rescales.
    let mut rgb = RgbPixels::new(meta.width, meta.height, source_depth)?;
    rgb.copy_flipped_from(&raster)?;
    drop(raster);

    if let Err(e) = output.convert_rgb(&rgb) {
        warn!(source = %source.source_name(), error = %e, "YUV conversion failed");
        return Err(AvifTiffError::conversion_failed(
            source.source_name().into_owned(),
            e.to_string(),
        ));
    }
    debug!(source = %source.source_name(), depth = final_depth, "converted to YUV");
    Ok(source_depth)
}

/// Open the TIFF at `path` and run the full pipeline into `output`.
///
/// `requested_depth` of 0 means best fit (see [`resolve_output_depth`]).
pub fn read_tiff<O>(
    output: &mut O,
    path: &Path,
    format: YuvFormat,
    requested_depth: u32,
) -> Result<u32>
where
    O: YuvOutput + ?Sized,
{
    let mut source = TiffSource::open(path)?;
    read_from_source(output, &mut source, format, requested_depth)
}

// lib.rs
//
// avif-tiff: TIFF ingestion for an AVIF-bound image pipeline.
//
// Design goals:
// - Delegate container parsing and color math to the tiff crate and libavif
// - Linear, single-threaded ownership: every resource released exactly once
// - Typed errors instead of boolean-plus-stderr

pub mod codecs;
pub mod error;
pub mod reader;
pub mod rgb;
pub mod source;
pub mod tif;

#[cfg(test)]
pub(crate) mod track;

pub use codecs::avif::AvifImage;
pub use error::{AvifTiffError, ErrorCategory, Result};
pub use reader::{read_from_source, read_tiff, YuvFormat, YuvOutput};
pub use rgb::RgbPixels;
pub use source::{PlanarConfig, Raster, RasterSource, SourceMetadata};
pub use tif::TiffSource;

/// Largest accepted width or height, checked before any pixel is decoded.
pub const MAX_DIMENSION: u32 = 32768;

/// Largest accepted total pixel count (decompression-bomb guard).
pub const MAX_PIXELS: u64 = 100_000_000;

// src/tif.rs
//
// TIFF-backed RasterSource. Container parsing and sample decoding belong to
// the tiff crate; this module queries tags and repacks the decoded samples
// into the bottom-up packed-RGBA raster layout.

use crate::error::{AvifTiffError, Result};
use crate::source::{PlanarConfig, Raster, RasterSource, SourceMetadata};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

/// TIFF tag 34675 (embedded ICC profile), not named by `tiff::tags::Tag`.
const TAG_ICC_PROFILE: u16 = 34675;

/// A TIFF file opened for decoding. Owns the underlying file handle; the
/// handle closes when the source drops, on success and failure alike.
pub struct TiffSource {
    decoder: Decoder<BufReader<File>>,
    name: String,
}

impl std::fmt::Debug for TiffSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiffSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TiffSource {
    /// Open a seekable TIFF by path. `-` (the conventional stdin spelling)
    /// is rejected up front: TIFF requires random access.
    pub fn open(path: &Path) -> Result<Self> {
        if path.as_os_str() == "-" {
            return Err(AvifTiffError::streaming_unsupported("stdin"));
        }
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AvifTiffError::file_not_found(name.clone())
            } else {
                AvifTiffError::file_read_failed(name.clone(), e)
            }
        })?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| AvifTiffError::decode_failed(format!("not a readable TIFF: {e}")))?;
        Ok(Self { decoder, name })
    }
}

impl RasterSource for TiffSource {
    fn source_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn metadata(&mut self) -> Result<SourceMetadata> {
        let (width, height) = self
            .decoder
            .dimensions()
            .map_err(|_| AvifTiffError::metadata_incomplete("ImageWidth/ImageLength"))?;

        let bits_per_sample = self
            .decoder
            .find_tag_unsigned_vec::<u16>(Tag::BitsPerSample)
            .map_err(|e| AvifTiffError::decode_failed(format!("BitsPerSample: {e}")))?
            .and_then(|v| v.first().copied())
            .ok_or_else(|| AvifTiffError::metadata_incomplete("BitsPerSample"))?;

        let samples_per_pixel = self
            .decoder
            .find_tag_unsigned::<u16>(Tag::SamplesPerPixel)
            .map_err(|e| AvifTiffError::decode_failed(format!("SamplesPerPixel: {e}")))?
            .ok_or_else(|| AvifTiffError::metadata_incomplete("SamplesPerPixel"))?;

        // Baseline writers omit PlanarConfiguration when it is the default;
        // missing means chunky (value 1) per the TIFF specification.
        let planar = self
            .decoder
            .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)
            .map_err(|e| AvifTiffError::decode_failed(format!("PlanarConfiguration: {e}")))?
            .unwrap_or(1);
        let planar_config = match planar {
            1 => PlanarConfig::Chunky,
            2 => PlanarConfig::Planar,
            other => {
                return Err(AvifTiffError::unsupported_format(format!(
                    "PlanarConfiguration {other}"
                )))
            }
        };

        Ok(SourceMetadata {
            width,
            height,
            bits_per_sample: u32::from(bits_per_sample),
            samples_per_pixel: u32::from(samples_per_pixel),
            planar_config,
        })
    }

    fn icc_profile(&mut self) -> Result<Option<Vec<u8>>> {
        let bytes = self
            .decoder
            .find_tag_unsigned_vec::<u8>(Tag::Unknown(TAG_ICC_PROFILE))
            .map_err(|e| AvifTiffError::decode_failed(format!("ICC profile: {e}")))?;
        Ok(bytes.filter(|b| !b.is_empty()))
    }

    fn decode_rgba(&mut self, raster: &mut Raster) -> Result<()> {
        let color_type = self
            .decoder
            .colortype()
            .map_err(|e| AvifTiffError::decode_failed(format!("color type: {e}")))?;
        let channels: usize = match color_type {
            ColorType::Gray(8) => 1,
            ColorType::GrayA(8) => 2,
            ColorType::RGB(8) => 3,
            ColorType::RGBA(8) => 4,
            other => {
                return Err(AvifTiffError::unsupported_format(format!(
                    "{other:?} (only 8-bit gray and RGB layouts decode to RGBA)"
                )))
            }
        };

        let decoded = self
            .decoder
            .read_image()
            .map_err(|e| AvifTiffError::decode_failed(e.to_string()))?;
        let samples = match decoded {
            DecodingResult::U8(samples) => samples,
            _ => {
                return Err(AvifTiffError::decode_failed(
                    "decoder produced non-8-bit samples",
                ))
            }
        };

        let width = raster.width() as usize;
        let height = raster.height() as usize;
        let expected = width * height * channels;
        if samples.len() != expected {
            return Err(AvifTiffError::decode_failed(format!(
                "decoded {} samples, expected {expected}",
                samples.len()
            )));
        }

        // The container stores rows top-down; the raster contract is
        // bottom-up, so file row y lands at raster row height - 1 - y.
        for y in 0..height {
            let src = &samples[y * width * channels..(y + 1) * width * channels];
            let dst = raster.row_mut((height - 1 - y) as u32);
            for x in 0..width {
                let s = &src[x * channels..(x + 1) * channels];
                let d = &mut dst[x * 4..(x + 1) * 4];
                match channels {
                    1 => {
                        d[0] = s[0];
                        d[1] = s[0];
                        d[2] = s[0];
                        d[3] = u8::MAX;
                    }
                    2 => {
                        d[0] = s[0];
                        d[1] = s[0];
                        d[2] = s[0];
                        d[3] = s[1];
                    }
                    3 => {
                        d[0] = s[0];
                        d[1] = s[1];
                        d[2] = s[2];
                        d[3] = u8::MAX;
                    }
                    _ => d.copy_from_slice(s),
                }
            }
        }
        Ok(())
    }
}

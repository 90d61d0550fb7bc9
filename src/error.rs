// src/error.rs
//
// Unified error handling for avif-tiff
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - UserError: Invalid input, recoverable
// - CodecError: Format/decode/conversion issues
// - ResourceLimit: Memory/dimension limits
// - InternalBug: Library bugs (should not happen)

use std::borrow::Cow;
use thiserror::Error;

/// Error taxonomy for callers that need to decide between retrying with
/// different parameters and abandoning the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid input, recoverable by user
    UserError,
    /// Format/decode/conversion issues
    CodecError,
    /// Memory/dimension limits
    ResourceLimit,
    /// Library bugs (should not happen)
    InternalBug,
}

/// avif-tiff error types
///
/// All errors are type-safe and provide clear, actionable messages.
/// No numeric error codes - just clear error variants.
#[derive(Debug, Error)]
pub enum AvifTiffError {
    // Input errors
    #[error("TIFF files require random access, can't read from {source_name}")]
    StreamingUnsupported { source_name: Cow<'static, str> },

    #[error("File not found: {path}")]
    FileNotFound { path: Cow<'static, str> },

    #[error("Can't open TIFF file for read '{path}': {source}")]
    FileReadFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    // Metadata errors
    #[error("TIFF is missing required metadata: {tag}")]
    MetadataIncomplete { tag: Cow<'static, str> },

    // Decode errors
    #[error("Unsupported TIFF layout: {detail}")]
    UnsupportedFormat { detail: Cow<'static, str> },

    #[error("Failed to decode TIFF: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    // Size limit errors
    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    #[error("Failed to allocate {bytes} bytes for {buffer}")]
    AllocationFailed {
        buffer: Cow<'static, str>,
        bytes: usize,
    },

    // Conversion errors
    #[error("Conversion to YUV failed: {source_name}: {message}")]
    ConversionFailed {
        source_name: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    #[error("libavif {operation} failed with code {code}")]
    AvifFailed {
        operation: Cow<'static, str>,
        code: u32,
    },

    // Internal errors
    #[error("Internal error: {message}")]
    InternalPanic { message: Cow<'static, str> },
}

// Constructor Helpers
impl AvifTiffError {
    pub fn streaming_unsupported(source_name: impl Into<Cow<'static, str>>) -> Self {
        Self::StreamingUnsupported {
            source_name: source_name.into(),
        }
    }

    pub fn file_not_found(path: impl Into<Cow<'static, str>>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn file_read_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn metadata_incomplete(tag: impl Into<Cow<'static, str>>) -> Self {
        Self::MetadataIncomplete { tag: tag.into() }
    }

    pub fn unsupported_format(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            detail: detail.into(),
        }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn allocation_failed(buffer: impl Into<Cow<'static, str>>, bytes: usize) -> Self {
        Self::AllocationFailed {
            buffer: buffer.into(),
            bytes,
        }
    }

    pub fn conversion_failed(
        source_name: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::ConversionFailed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn avif_failed(operation: impl Into<Cow<'static, str>>, code: u32) -> Self {
        Self::AvifFailed {
            operation: operation.into(),
            code,
        }
    }

    pub fn internal_panic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InternalPanic {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (user can fix it)
    ///
    /// This method is consistent with category():
    /// - UserError errors are always recoverable
    /// - ResourceLimit errors are recoverable (smaller input, more memory)
    /// - CodecError and InternalBug errors are not recoverable
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::ResourceLimit => true,
            ErrorCategory::CodecError | ErrorCategory::InternalBug => false,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            // UserError: Invalid input, recoverable
            Self::StreamingUnsupported { .. } | Self::FileNotFound { .. } => {
                ErrorCategory::UserError
            }

            // CodecError: Format/decode/conversion issues
            Self::MetadataIncomplete { .. }
            | Self::UnsupportedFormat { .. }
            | Self::DecodeFailed { .. }
            | Self::ConversionFailed { .. }
            | Self::AvifFailed { .. } => ErrorCategory::CodecError,

            // ResourceLimit: Memory/dimension limits.
            // FileReadFailed often indicates resource constraints (permissions,
            // file locks, disk pressure) and is recoverable by the user.
            Self::DimensionExceedsLimit { .. }
            | Self::PixelCountExceedsLimit { .. }
            | Self::AllocationFailed { .. }
            | Self::FileReadFailed { .. } => ErrorCategory::ResourceLimit,

            // InternalBug: Library bugs (should not happen)
            Self::InternalPanic { .. } => ErrorCategory::InternalBug,
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, AvifTiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AvifTiffError::file_not_found("/path/to/image.tif");
        assert!(err.to_string().contains("/path/to/image.tif"));

        let err = AvifTiffError::conversion_failed("input.tif", "code 12");
        assert!(err.to_string().contains("Conversion to YUV failed"));
        assert!(err.to_string().contains("input.tif"));
    }

    #[test]
    fn test_streaming_unsupported_mentions_random_access() {
        let err = AvifTiffError::streaming_unsupported("stdin");
        assert!(err.to_string().contains("random access"));
    }

    #[test]
    fn test_error_recoverable() {
        assert!(AvifTiffError::file_not_found("a.tif").is_recoverable());
        assert!(AvifTiffError::allocation_failed("raster", 16).is_recoverable());
        assert!(!AvifTiffError::decode_failed("bad strip").is_recoverable());
        assert!(!AvifTiffError::internal_panic("bug").is_recoverable());
    }

    #[test]
    fn test_error_category_user_error() {
        assert_eq!(
            AvifTiffError::streaming_unsupported("stdin").category(),
            ErrorCategory::UserError
        );
        assert_eq!(
            AvifTiffError::file_not_found("a.tif").category(),
            ErrorCategory::UserError
        );
    }

    #[test]
    fn test_error_category_codec_error() {
        assert_eq!(
            AvifTiffError::metadata_incomplete("BitsPerSample").category(),
            ErrorCategory::CodecError
        );
        assert_eq!(
            AvifTiffError::unsupported_format("CMYK").category(),
            ErrorCategory::CodecError
        );
        assert_eq!(
            AvifTiffError::decode_failed("truncated").category(),
            ErrorCategory::CodecError
        );
        assert_eq!(
            AvifTiffError::conversion_failed("a.tif", "code 12").category(),
            ErrorCategory::CodecError
        );
        assert_eq!(
            AvifTiffError::avif_failed("avifImageRGBToYUV", 12).category(),
            ErrorCategory::CodecError
        );
    }

    #[test]
    fn test_error_category_resource_limit() {
        assert_eq!(
            AvifTiffError::dimension_exceeds_limit(40000, 32768).category(),
            ErrorCategory::ResourceLimit
        );
        assert_eq!(
            AvifTiffError::pixel_count_exceeds_limit(1_000_000_000, 100_000_000).category(),
            ErrorCategory::ResourceLimit
        );
        assert_eq!(
            AvifTiffError::allocation_failed("RGB buffer", 1 << 30).category(),
            ErrorCategory::ResourceLimit
        );
        assert_eq!(
            AvifTiffError::file_read_failed(
                "a.tif",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied)
            )
            .category(),
            ErrorCategory::ResourceLimit
        );
    }

    #[test]
    fn test_error_category_internal_bug() {
        assert_eq!(
            AvifTiffError::internal_panic("bug").category(),
            ErrorCategory::InternalBug
        );
    }
}

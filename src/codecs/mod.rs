// src/codecs/mod.rs
//
// Codec-specific safe abstractions for FFI operations.

pub mod avif;

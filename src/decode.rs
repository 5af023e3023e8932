//! Image decoding seam.
//!
//! The coordinator only needs "bytes in, displayable image out"; keeping it a
//! trait lets tests inject fixtures without real codecs.

use crate::error::{Error, Result};

/// Decodes raw fetched bytes into a displayable image.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<image::DynamicImage>;
}

/// Decoder backed by the `image` crate (PNG/JPEG per enabled features).
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDecoder;

impl ImageDecoder for StdDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<image::DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))
    }
}
